//! Bluetooth RFCOMM transport.
//!
//! The protocol engine only needs a connected duplex byte stream; the
//! [`Transport`] trait is that seam, and [`RfcommSocket`] is the real
//! implementation: a raw AF_BLUETOOTH / SOCK_STREAM / BTPROTO_RFCOMM socket.
//! Pairing is expected to have happened already (bluetoothctl or the desktop
//! Bluetooth settings); discovery is out of scope.

use crate::error::{Error, Result};
use std::os::unix::io::RawFd;
use std::time::Duration;

// From <bluetooth/bluetooth.h> and <bluetooth/rfcomm.h>.
const AF_BLUETOOTH: i32 = 31;
const BTPROTO_RFCOMM: i32 = 3;

/// Reads block at most this long. The completion poll is the only unbounded
/// wait in the protocol and a cut of a long label can take a while, so this
/// is generous; an unresponsive device still cannot hang the caller forever.
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// A connected duplex byte stream to the printer. Both calls block.
pub trait Transport {
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive at most `buf.len()` bytes, returning the count actually read.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// sockaddr_rc from <bluetooth/rfcomm.h>.
#[repr(C)]
struct SockaddrRc {
    rc_family: u16,
    rc_bdaddr: [u8; 6],
    rc_channel: u8,
}

/// An RFCOMM connection to the printer, closed on drop.
pub struct RfcommSocket {
    fd: RawFd,
    address: String,
    channel: u8,
}

impl RfcommSocket {
    /// Connect to `address` ("EC:79:49:63:2A:80") on the given RFCOMM
    /// channel. Failures carry the address and channel so the operator knows
    /// which device to check.
    pub fn connect(address: &str, channel: u8) -> Result<Self> {
        let bdaddr = parse_bdaddr(address)?;

        let fd = unsafe { libc::socket(AF_BLUETOOTH, libc::SOCK_STREAM, BTPROTO_RFCOMM) };
        if fd < 0 {
            return Err(connect_error(address, channel));
        }

        let sa = SockaddrRc {
            rc_family: AF_BLUETOOTH as u16,
            rc_bdaddr: bdaddr,
            rc_channel: channel,
        };
        let ret = unsafe {
            libc::connect(
                fd,
                &sa as *const SockaddrRc as *const libc::sockaddr,
                std::mem::size_of::<SockaddrRc>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            let err = connect_error(address, channel);
            unsafe {
                libc::close(fd);
            }
            return Err(err);
        }

        let socket = RfcommSocket {
            fd,
            address: address.to_string(),
            channel,
        };
        socket.set_timeout(libc::SO_RCVTIMEO, READ_TIMEOUT)?;
        socket.set_timeout(libc::SO_SNDTIMEO, SEND_TIMEOUT)?;
        log::debug!("connected to {} (channel {})", socket.address, socket.channel);
        Ok(socket)
    }

    fn set_timeout(&self, option: i32, timeout: Duration) -> Result<()> {
        let tv = libc::timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: timeout.subsec_micros() as libc::suseconds_t,
        };
        let ret = unsafe {
            libc::setsockopt(
                self.fd,
                libc::SOL_SOCKET,
                option,
                &tv as *const libc::timeval as *const libc::c_void,
                std::mem::size_of::<libc::timeval>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl Transport for RfcommSocket {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        log::debug!("TX {} bytes: {:02x?}", data.len(), &data[..data.len().min(32)]);
        let mut sent = 0;
        while sent < data.len() {
            let n = unsafe {
                libc::send(
                    self.fd,
                    data[sent..].as_ptr() as *const libc::c_void,
                    data.len() - sent,
                    0,
                )
            };
            if n < 0 {
                return Err(Error::Io(std::io::Error::last_os_error()));
            }
            sent += n as usize;
        }
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = unsafe { libc::recv(self.fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len(), 0) };
        if n < 0 {
            let err = std::io::Error::last_os_error();
            return Err(match err.kind() {
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                    Error::ReadTimeout
                }
                _ => Error::Io(err),
            });
        }
        if n == 0 {
            return Err(Error::Disconnected);
        }
        log::debug!("RX {} bytes: {:02x?}", n, &buf[..n as usize]);
        Ok(n as usize)
    }
}

impl Drop for RfcommSocket {
    fn drop(&mut self) {
        log::debug!("closing connection to {}", self.address);
        unsafe {
            libc::close(self.fd);
        }
    }
}

fn connect_error(address: &str, channel: u8) -> Error {
    Error::Connect {
        address: address.to_string(),
        channel,
        source: std::io::Error::last_os_error(),
    }
}

/// Parse "XX:XX:XX:XX:XX:XX" into the 6 bdaddr bytes. BlueZ stores the
/// address in reversed byte order (LSB first).
fn parse_bdaddr(address: &str) -> Result<[u8; 6]> {
    let parts: Vec<&str> = address.split(':').collect();
    if parts.len() != 6 {
        return Err(Error::InvalidAddress(address.to_string()));
    }
    let mut bdaddr = [0u8; 6];
    for (i, part) in parts.iter().enumerate() {
        bdaddr[5 - i] = u8::from_str_radix(part, 16)
            .map_err(|_| Error::InvalidAddress(address.to_string()))?;
    }
    Ok(bdaddr)
}
