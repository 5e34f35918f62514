pub mod config;
pub mod container;
pub mod manuscript;
pub mod port;

pub use config::ManuscriptConfig;
pub use container::{ContainerInfo, JobStatus};
pub use manuscript::{Manuscript, Sink, SinkConfig, Source, Transform};
pub use port::{PortReservation, PortRole};
