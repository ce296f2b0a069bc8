//! Socket setup shared by the listeners.

use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, SockRef, Socket, Type};

/// Sets the receive buffer size for a socket.
///
/// This is the equivalent of setting the `SO_RCVBUF` socket setting directly.
pub fn set_receive_buffer_size<'s, S>(socket: &'s S, size: usize) -> io::Result<()>
where
    SockRef<'s>: From<&'s S>,
{
    SockRef::from(socket).set_recv_buffer_size(size)
}

/// Binds a non-blocking UDP socket ready to be handed to tokio.
///
/// An unspecified IPv6 address also accepts IPv4 traffic where the platform
/// allows turning `IPV6_V6ONLY` off.
pub fn bind_udp(address: SocketAddr, receive_buffer_bytes: Option<usize>) -> io::Result<std::net::UdpSocket> {
    let socket = Socket::new(Domain::for_address(address), Type::DGRAM, Some(Protocol::UDP))?;
    if let SocketAddr::V6(v6) = address
        && v6.ip().is_unspecified()
    {
        // Not every platform lets us clear the flag; IPv6 alone still works.
        let _ = socket.set_only_v6(false);
    }
    if let Some(size) = receive_buffer_bytes {
        set_receive_buffer_size(&socket, size)?;
    }
    socket.set_nonblocking(true)?;
    socket.bind(&address.into())?;
    Ok(socket.into())
}
