/*!
 * Bound Sockets
 * Sockets that follow the process network binding
 */

use super::linux::process_binding;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;
use tracing::trace;

/// Create a socket attached to the bound network, if any
pub fn bound_socket(domain: Domain, ty: Type, protocol: Option<Protocol>) -> io::Result<Socket> {
    let socket = Socket::new(domain, ty, protocol)?;
    apply_binding(&socket)?;
    Ok(socket)
}

/// Open a TCP connection that leaves through the bound network
pub fn connect_tcp(addr: SocketAddr, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let socket = bound_socket(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    let target = SockAddr::from(addr);
    match timeout {
        Some(timeout) => socket.connect_timeout(&target, timeout)?,
        None => socket.connect(&target)?,
    }
    Ok(socket.into())
}

#[cfg(any(target_os = "android", target_os = "fuchsia", target_os = "linux"))]
fn apply_binding(socket: &Socket) -> io::Result<()> {
    if let Some(handle) = process_binding() {
        trace!(network = %handle, "Attaching socket to bound network");
        socket.bind_device(Some(handle.interface().as_bytes()))?;
    }
    Ok(())
}

#[cfg(not(any(target_os = "android", target_os = "fuchsia", target_os = "linux")))]
fn apply_binding(_socket: &Socket) -> io::Result<()> {
    if let Some(handle) = process_binding() {
        trace!(network = %handle, "Device binding unsupported, using default route");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    #[test]
    #[serial]
    fn test_unbound_connect_uses_default_route() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = connect_tcp(addr, Some(Duration::from_secs(2))).unwrap();
        let (mut server, _) = listener.accept().unwrap();

        client.write_all(b"ping").unwrap();
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
    }

    #[test]
    #[serial]
    fn test_bound_socket_without_binding() {
        let socket = bound_socket(Domain::IPV4, Type::DGRAM, None).unwrap();
        assert_eq!(socket.r#type().unwrap(), Type::DGRAM);
    }
}
