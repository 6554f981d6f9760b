pub mod bulk;
pub mod constants;
pub mod datetime;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod generation;
pub mod legacy;
pub mod link;
pub mod packet;
pub mod parser;
pub mod samples;
pub mod transport;
pub mod units;


pub use descriptor::{Descriptor, DiveMode, select_variant};
pub use device::{CancelToken, DeviceEvent, Dive, Session, SessionConfig, SyncStatus};
pub use error::DcError;
pub use generation::{DEEP6, EXCURSION, ProtocolGeneration};
pub use parser::{DiveSummary, Parser, decode_samples, decode_summary};
pub use samples::SampleEvent;
pub use transport::Transport;
