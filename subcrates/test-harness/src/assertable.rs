use std::path::Path;

/// Asserts that the file at `path` contains exactly `expected_content`.
///
/// On mismatch, the panic message reports the lengths and the first differing offset
/// instead of dumping both buffers.
pub fn assert_file_content_eq<P>(path: P, expected_content: &[u8])
where
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let actual_content = std::fs::read(path).unwrap_or_else(|error| {
        panic!(
            "failed to read file \"{}\" for content comparison: {error}",
            path.display()
        )
    });

    assert_content_eq(&actual_content, expected_content, &path.display().to_string());
}

/// Asserts that `actual_content` equals `expected_content`.
///
/// `what` names the compared content in the panic message.
pub fn assert_content_eq(actual_content: &[u8], expected_content: &[u8], what: &str) {
    if actual_content.len() != expected_content.len() {
        panic!(
            "{what}: content length mismatch (expected {} bytes, got {} bytes)",
            expected_content.len(),
            actual_content.len()
        );
    }

    if let Some(first_mismatch) = actual_content
        .iter()
        .zip(expected_content)
        .position(|(actual, expected)| actual != expected)
    {
        panic!(
            "{what}: content mismatch at byte offset {first_mismatch} \
            (expected {:#04x}, got {:#04x})",
            expected_content[first_mismatch], actual_content[first_mismatch]
        );
    }
}
