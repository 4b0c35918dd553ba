//! Rendering of replayed traversal records.

use selstore_core::{CoreResult, TraversedLink};
use serde::Serialize;

/// One replayed record, ready for output.
#[derive(Debug, Serialize)]
pub struct RecordInfo {
    /// Position in the traversal.
    pub index: usize,
    /// The loaded link's CID.
    pub cid: String,
    /// Where the link sat, `/`-separated.
    pub path: String,
    /// The load failure, if the load failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordInfo {
    fn new(index: usize, link: &TraversedLink) -> Self {
        Self {
            index,
            cid: link.link().to_string(),
            path: link.link_path().to_string(),
            error: link.load_error().map(str::to_string),
        }
    }
}

/// Collects up to `limit` records.
///
/// A decode error ends collection; the records read before it are kept and
/// the error is returned alongside.
pub fn collect<I>(records: I, limit: Option<usize>) -> (Vec<RecordInfo>, Option<String>)
where
    I: Iterator<Item = CoreResult<TraversedLink>>,
{
    let mut infos = Vec::new();
    for (index, record) in records.take(limit.unwrap_or(usize::MAX)).enumerate() {
        match record {
            Ok(link) => infos.push(RecordInfo::new(index, &link)),
            Err(err) => return (infos, Some(err.to_string())),
        }
    }
    (infos, None)
}

/// Prints records in the requested format.
pub fn print(records: &[RecordInfo], format: &str) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        _ => {
            print_text_output(records);
        }
    }
    Ok(())
}

fn print_text_output(records: &[RecordInfo]) {
    println!("Traversed links ({} total)", records.len());
    println!("================");
    println!();

    for record in records {
        let path = if record.path.is_empty() {
            "(root)"
        } else {
            record.path.as_str()
        };
        print!("[{:06}] {} at {}", record.index, record.cid, path);
        if let Some(ref error) = record.error {
            print!(" error={:?}", error);
        }
        println!();
    }
}
