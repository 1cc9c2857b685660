//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements   | Connects to                        |
//! |------------|--------------|------------------------------------|
//! | `gpio`     | OutputPort   | Raspberry Pi GPIO (or memory mock) |
//! | `upload`   | UploadPort   | Weather Underground PWS upload API |
//! | `probe`    | ProbePort    | system `ping` against a known host |
//! | `log_sink` | EventSink    | the tracing log stream             |

pub mod gpio;
pub mod log_sink;
pub mod probe;
pub mod upload;
