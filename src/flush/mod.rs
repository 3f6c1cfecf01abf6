mod jsonl;

pub use jsonl::{SECTIONS, flush_to_jsonl, read_jsonl};
