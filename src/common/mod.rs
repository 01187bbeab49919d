//! Common utility modules shared by the merge and patch procedures.

pub mod fs;
