//! Plugin execution: the re-run gate and the tool invoker

pub mod gate;
pub mod invoker;

pub use gate::ExecutionGate;
pub use invoker::{Invoke, ModuleInvoker, OUTPUT_DIR_FLAG};
