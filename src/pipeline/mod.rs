pub mod decode;
pub mod extraction;
pub mod intake;
pub mod processor; // Upload orchestration: probe → decode → extract
pub mod underwriting;
