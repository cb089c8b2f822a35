pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{Result, ShowroomError};
pub use memory::{InMemoryIdentity, InMemoryRecordStore, InMemoryStorage};
pub use traits::{IdentityProvider, RecordStore, RemovalReport, StorageGateway};
pub use types::{
    tables, AuthSession, AuthUser, Filter, MatchKey, Notice, NoticeLevel, Order, Query,
    RecordKind, Role, Row,
};
