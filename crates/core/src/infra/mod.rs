pub mod completion;
pub mod extractor;
pub mod folder;
pub mod metrics;
pub mod output;
pub mod pricing;
pub mod rewriter;
