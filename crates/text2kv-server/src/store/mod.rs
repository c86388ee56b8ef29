pub mod backend;
pub mod db;
pub mod gateway;

pub use backend::{KvBackend, MemoryBackend, ReadOptions};
pub use db::RedbBackend;
pub use gateway::{ContentStore, IP_LIST_KEY, NO_IP_DATA};
