pub mod acceptor;
pub mod conn;
pub mod request;
pub mod search_worker;

pub use acceptor::Acceptor;
pub use conn::Conn;
pub use search_worker::SearchWorker;
