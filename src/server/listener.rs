// Listener module
// Creates TCP listeners for the development server and per-invocation front door

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Create a non-blocking `TcpListener` bound to `addr`.
///
/// `reuse` enables `SO_REUSEADDR` so a restarted development server can bind
/// a port still in `TIME_WAIT`. Per-invocation listeners bind port 0 and
/// skip it.
pub fn create_listener(addr: std::net::SocketAddr, reuse: bool) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if reuse {
        socket.set_reuse_address(true)?;
    }
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;

    // One invocation needs one slot; the dev server gets a normal backlog
    socket.listen(if addr.port() == 0 { 1 } else { 128 })?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
