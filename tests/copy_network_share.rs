use assert_matches::assert_matches;
use fs_transfer::{
    error::CopyError,
    FileCopier,
    Location,
    ProgressCounter,
    SourceFile,
    TargetFile,
    TransferProgress,
    TransferStrategy,
};
use fs_transfer_test_harness::prelude::*;
use tracing_test::traced_test;



#[test]
pub fn share_to_share_copy_streams_everything() -> TestResult {
    let source_data = seeded_binary_data(70_000, 1204871);

    let source_share = InMemoryShareFile::with_contents("smb://nas/media/a.bin", source_data.clone());
    let destination_share = InMemoryShareFile::new("smb://nas/backup/a.bin");

    let progress = ProgressCounter::new();

    let finished = FileCopier::new().copy(
        &SourceFile::new(
            Location::network_share(source_share.clone()),
            source_data.len() as u64,
        ),
        &TargetFile::new(Location::network_share(destination_share.clone())),
        &progress,
    )?;


    assert_eq!(finished.strategy, TransferStrategy::StreamToStream);
    assert_eq!(finished.bytes_copied, 70_000);
    assert!(finished.cleanup_warnings.is_empty());

    assert_eq!(
        progress.snapshot(),
        TransferProgress {
            bytes_finished: 70_000,
            bytes_total: 70_000,
        }
    );

    assert_content_eq(&destination_share.contents(), &source_data, "destination share");

    assert_eq!(source_share.tracker().opened(), 1);
    assert_eq!(source_share.tracker().open_handles(), 0);
    assert_eq!(destination_share.tracker().opened(), 1);
    assert_eq!(destination_share.tracker().open_handles(), 0);

    Ok(())
}


#[test]
pub fn share_to_local_copy_writes_through_a_mapping() -> TestResult {
    let temporary_directory = TempDir::new()?;
    let destination_file = temporary_directory.child("from-share.bin");

    let source_data = seeded_binary_data(40_000, 88123);
    let source_share = InMemoryShareFile::with_contents("smb://nas/media/b.bin", source_data.clone());

    let progress = ProgressCounter::new();

    let finished = FileCopier::new().copy(
        &SourceFile::new(Location::network_share(source_share.clone()), 40_000),
        &TargetFile::new(Location::local(destination_file.path())),
        &progress,
    )?;


    assert_eq!(finished.strategy, TransferStrategy::StreamToMapped);
    assert_eq!(finished.bytes_copied, 40_000);
    assert_eq!(progress.bytes_finished(), 40_000);

    assert_file_content_eq(destination_file.path(), &source_data);
    assert_eq!(source_share.tracker().open_handles(), 0);


    temporary_directory.close()?;
    Ok(())
}


#[test]
pub fn local_to_share_copy_drains_a_mapping() -> TestResult {
    let temporary_directory = TempDir::new()?;
    let source_file = temporary_directory.child("to-share.bin");

    let source_data = seeded_binary_data(33_333, 5123);
    source_file.write_binary(&source_data)?;

    let destination_share = InMemoryShareFile::new("smb://nas/backup/c.bin");
    let progress = ProgressCounter::new();

    let finished = FileCopier::new().copy(
        &SourceFile::from_local_path(source_file.path())?,
        &TargetFile::new(Location::network_share(destination_share.clone())),
        &progress,
    )?;


    assert_eq!(finished.strategy, TransferStrategy::MappedToStream);
    assert_eq!(finished.bytes_copied, 33_333);
    assert_eq!(progress.bytes_finished(), 33_333);

    assert_content_eq(&destination_share.contents(), &source_data, "destination share");
    assert_eq!(destination_share.tracker().open_handles(), 0);


    temporary_directory.close()?;
    Ok(())
}


#[test]
pub fn empty_local_file_to_share_writes_nothing() -> TestResult {
    let temporary_directory = TempDir::new()?;
    let source_file = temporary_directory.child("empty.bin");
    source_file.write_binary(&[])?;

    let destination_share = InMemoryShareFile::with_contents(
        "smb://nas/backup/empty.bin",
        b"stale contents".to_vec(),
    );
    let progress = ProgressCounter::new();

    let finished = FileCopier::new().copy(
        &SourceFile::from_local_path(source_file.path())?,
        &TargetFile::new(Location::network_share(destination_share.clone())),
        &progress,
    )?;


    assert_eq!(finished.strategy, TransferStrategy::MappedToStream);
    assert_eq!(finished.bytes_copied, 0);
    assert_eq!(
        progress.snapshot(),
        TransferProgress {
            bytes_finished: 0,
            bytes_total: 0,
        }
    );

    assert!(destination_share.contents().is_empty());
    assert_eq!(destination_share.tracker().open_handles(), 0);


    temporary_directory.close()?;
    Ok(())
}


#[test]
pub fn non_empty_share_stream_declared_as_empty_fails() -> TestResult {
    let temporary_directory = TempDir::new()?;
    let destination_file = temporary_directory.child("declared-empty.bin");

    let source_share = InMemoryShareFile::with_contents(
        "smb://nas/media/declared-empty.bin",
        seeded_binary_data(5000, 73),
    );

    let progress = ProgressCounter::new();

    let copy_result = FileCopier::new().copy(
        &SourceFile::new(Location::network_share(source_share.clone()), 0),
        &TargetFile::new(Location::local(destination_file.path())),
        &progress,
    );


    assert_matches!(
        copy_result.unwrap_err(),
        CopyError::TransferFailed { strategy: TransferStrategy::StreamToMapped, error }
        if error.kind() == std::io::ErrorKind::InvalidData
    );

    assert_eq!(progress.bytes_finished(), 0);
    assert_eq!(source_share.tracker().open_handles(), 0);


    temporary_directory.close()?;
    Ok(())
}


#[test]
pub fn slow_share_reads_still_produce_an_identical_copy() -> TestResult {
    let temporary_directory = TempDir::new()?;
    let destination_file = temporary_directory.child("slow.bin");

    let source_data = seeded_binary_data(25_000, 4411);
    let source_share =
        InMemoryShareFile::with_contents("smb://nas/media/slow.bin", source_data.clone())
            .with_chunked_reads(1000);

    let progress = ProgressCounter::new();

    FileCopier::new().copy(
        &SourceFile::new(Location::network_share(source_share), 25_000),
        &TargetFile::new(Location::local(destination_file.path())),
        &progress,
    )?;


    assert_file_content_eq(destination_file.path(), &source_data);
    assert_eq!(progress.bytes_finished(), 25_000);


    temporary_directory.close()?;
    Ok(())
}


#[test]
#[traced_test]
pub fn share_failing_midway_reports_a_transfer_failure_and_closes_everything() -> TestResult {
    let source_data = seeded_binary_data(65_536, 99);

    let source_share = InMemoryShareFile::with_contents("smb://nas/media/d.bin", source_data.clone());
    let destination_share =
        InMemoryShareFile::new("smb://nas/backup/d.bin").failing_after(16384);

    let progress = ProgressCounter::new();

    let copy_result = FileCopier::new().copy(
        &SourceFile::new(Location::network_share(source_share.clone()), 65_536),
        &TargetFile::new(Location::network_share(destination_share.clone())),
        &progress,
    );


    assert_matches!(
        copy_result.unwrap_err(),
        CopyError::TransferFailed { strategy: TransferStrategy::StreamToStream, error }
        if error.kind() == std::io::ErrorKind::ConnectionReset
    );

    assert!(progress.bytes_finished() >= 16384);
    assert!(progress.bytes_finished() <= 65_536);
    assert_eq!(progress.bytes_total(), 65_536);

    assert_eq!(destination_share.contents(), source_data[..16384]);

    assert_eq!(source_share.tracker().open_handles(), 0);
    assert_eq!(destination_share.tracker().open_handles(), 0);

    assert!(logs_contain("transfer failed"));

    Ok(())
}


#[test]
pub fn share_stream_shorter_than_declared_truncates_the_local_destination() -> TestResult {
    let temporary_directory = TempDir::new()?;
    let destination_file = temporary_directory.child("short.bin");

    let source_data = seeded_binary_data(12_000, 71);
    let source_share = InMemoryShareFile::with_contents("smb://nas/media/e.bin", source_data.clone());

    let progress = ProgressCounter::new();

    let finished = FileCopier::new().copy(
        &SourceFile::new(Location::network_share(source_share), 20_000),
        &TargetFile::new(Location::local(destination_file.path())),
        &progress,
    )?;


    assert_eq!(finished.bytes_copied, 12_000);
    assert_eq!(
        progress.snapshot(),
        TransferProgress {
            bytes_finished: 12_000,
            bytes_total: 20_000,
        }
    );

    assert_file_content_eq(destination_file.path(), &source_data);


    temporary_directory.close()?;
    Ok(())
}


#[test]
pub fn share_stream_longer_than_declared_fails() -> TestResult {
    let temporary_directory = TempDir::new()?;
    let destination_file = temporary_directory.child("long.bin");

    let source_share = InMemoryShareFile::with_contents(
        "smb://nas/media/f.bin",
        seeded_binary_data(12_000, 72),
    );

    let progress = ProgressCounter::new();

    let copy_result = FileCopier::new().copy(
        &SourceFile::new(Location::network_share(source_share.clone()), 8000),
        &TargetFile::new(Location::local(destination_file.path())),
        &progress,
    );


    assert_matches!(
        copy_result.unwrap_err(),
        CopyError::TransferFailed { strategy: TransferStrategy::StreamToMapped, error }
        if error.kind() == std::io::ErrorKind::InvalidData
    );

    assert!(progress.bytes_finished() <= 8000);
    assert_eq!(source_share.tracker().open_handles(), 0);


    temporary_directory.close()?;
    Ok(())
}
