//! Process execution for the LaTeX toolchain
//!
//! Every external tool (compiler, bibliography processor, code runner) is
//! launched through this crate. Invocation is blocking: the caller waits until
//! the child exits, while stdout and stderr are drained into bounded ring
//! buffers so a chatty compiler cannot exhaust memory.
//!
//! # Security Model
//!
//! All process execution goes through [`CommandSpec`] to ensure argv-style invocation.
//! Document names are passed as discrete arguments, never interpolated into a
//! shell string.

pub mod command_spec;
pub mod error;
pub mod native;
pub mod process;
pub mod ring_buffer;
pub mod types;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use native::{DEFAULT_STDERR_CAP_BYTES, DEFAULT_STDOUT_CAP_BYTES, NativeRunner};
pub use process::{ProcessOutput, ProcessRunner};
pub use ring_buffer::RingBuffer;
pub use types::ToolKind;
