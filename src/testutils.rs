use std::net::{SocketAddr, TcpListener};

use actix_web::web::ServiceConfig;
use actix_web::{App, HttpServer};

/// Serves `configure` on an ephemeral local port for the rest of the test.
pub fn start_server<F>(configure: F) -> SocketAddr
where
    F: Fn(&mut ServiceConfig) + Send + Clone + 'static,
{
    let server = HttpServer::new(move || App::new().configure(configure.clone()))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];

    actix_web::rt::spawn(server.run());

    addr
}

/// An address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}
