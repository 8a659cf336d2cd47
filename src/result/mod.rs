mod result;

pub use result::CommandResult;
