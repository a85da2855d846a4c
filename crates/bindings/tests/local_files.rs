//! End-to-end resolution against real files.

#![allow(clippy::unwrap_used)]

use bindstamp_bindings::{Progress, ResolverConfig, TimestampResolver};
use bindstamp_filesys::{LocalFileSystem, ScanConfig};
use bindstamp_pathsys::KeyStyle;
use bindstamp_timestamp::Timestamp;
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn write_at(path: &Path, contents: &[u8], secs: u64) {
    fs::write(path, contents).unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

fn ar_member(out: &mut Vec<u8>, name: &str, date: i64, data: &[u8]) {
    let header = format!(
        "{:<16}{date:<12}{:<6}{:<6}{:<8}{:<10}`\n",
        format!("{name}/"),
        0,
        0,
        644,
        data.len()
    );
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(b'\n');
    }
}

#[test]
fn files_are_timed_and_absent_files_are_no_entry() {
    let tmp = TempDir::new().unwrap();
    write_at(&tmp.path().join("main.c"), b"int main;", 1_000);
    write_at(&tmp.path().join("util.c"), b"", 2_000);
    let dir = tmp.path().to_str().unwrap();

    let resolver = TimestampResolver::new(LocalFileSystem::default());

    assert_eq!(resolver.resolve(&format!("{dir}/main.c")), Timestamp::new(1_000, 0));
    assert_eq!(resolver.resolve(&format!("{dir}/util.c")), Timestamp::new(2_000, 0));
    assert!(resolver.resolve(&format!("{dir}/nope.c")).is_empty());
    assert_eq!(
        resolver.progress(&format!("{dir}/nope.c")),
        Some(Progress::NoEntry)
    );

    let stats = resolver.stats();
    assert_eq!(stats.directory_scans, 1);
    assert_eq!(stats.time_queries, 2);
}

#[test]
fn stat_entries_times_files_during_the_scan() {
    let tmp = TempDir::new().unwrap();
    write_at(&tmp.path().join("a.h"), b"", 3_000);
    let dir = tmp.path().to_str().unwrap();

    let fs = LocalFileSystem::new(ScanConfig::default().with_stat_entries(true));
    let resolver = TimestampResolver::new(fs);

    assert_eq!(resolver.resolve(&format!("{dir}/a.h")), Timestamp::new(3_000, 0));
    assert_eq!(resolver.stats().time_queries, 0);
}

#[test]
fn ar_members_are_timed_from_the_member_table() {
    let tmp = TempDir::new().unwrap();
    let mut bytes = b"!<arch>\n".to_vec();
    ar_member(&mut bytes, "one.o", 1_111, b"abc");
    ar_member(&mut bytes, "two.o", 2_222, b"defg");
    fs::write(tmp.path().join("libx.a"), bytes).unwrap();
    let lib = tmp.path().join("libx.a");
    let lib = lib.to_str().unwrap();

    let resolver = TimestampResolver::new(LocalFileSystem::default());

    assert_eq!(resolver.resolve(&format!("{lib}(one.o)")), Timestamp::new(1_111, 0));
    assert_eq!(resolver.resolve(&format!("{lib}(two.o)")), Timestamp::new(2_222, 0));
    assert!(resolver.resolve(&format!("{lib}(three.o)")).is_empty());

    let stats = resolver.stats();
    assert_eq!(stats.archive_scans, 1);
    assert_eq!(stats.time_queries, 0);
}

fn tar_file(path: &Path, members: &[(&str, u64, &[u8])]) {
    let mut builder = tar::Builder::new(File::create(path).unwrap());
    for (name, mtime, data) in members {
        let mut header = tar::Header::new_ustar();
        header.set_size(data.len() as u64);
        header.set_mtime(*mtime);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.finish().unwrap();
}

#[test]
fn tar_member_in_subfolder_resolves_when_queried_first() {
    let tmp = TempDir::new().unwrap();
    let pkg = tmp.path().join("pkg.tar");
    tar_file(&pkg, &[("top.o", 11, b"t"), ("sub/deep.o", 22, b"d")]);
    let pkg = pkg.to_str().unwrap();

    let resolver = TimestampResolver::new(LocalFileSystem::default());

    assert_eq!(
        resolver.resolve(&format!("{pkg}(sub/deep.o)")),
        Timestamp::new(22, 0)
    );
    let stats = resolver.stats();
    assert_eq!(stats.directory_scans, 1);
    assert_eq!(stats.archive_scans, 1);

    assert_eq!(resolver.resolve(&format!("{pkg}(top.o)")), Timestamp::new(11, 0));
    assert_eq!(resolver.stats(), stats);
}

#[test]
fn case_folded_keys_still_read_mixed_case_paths() {
    let tmp = TempDir::new().unwrap();
    let mixed = tmp.path().join("Mixed");
    fs::create_dir(&mixed).unwrap();
    write_at(&mixed.join("Main.c"), b"int main;", 4_000);
    let dir = mixed.to_str().unwrap();

    let config = ResolverConfig::default().with_key_style(KeyStyle::CaseFolded);
    let resolver = TimestampResolver::with_config(LocalFileSystem::default(), config);

    let path = format!("{dir}/Main.c");
    assert_eq!(resolver.resolve(&path), Timestamp::new(4_000, 0));
    assert_eq!(resolver.progress(&path), Some(Progress::Found));

    // Any casing of the same path now hits the stored binding.
    let shouted = format!("{dir}/MAIN.C");
    assert_eq!(resolver.resolve(&shouted), Timestamp::new(4_000, 0));
    assert_eq!(resolver.stats().time_queries, 1);
}

#[test]
fn directory_targets_resolve_to_their_own_time() {
    let tmp = TempDir::new().unwrap();
    let sub = tmp.path().join("sub");
    fs::create_dir(&sub).unwrap();
    let expected = Timestamp::from(fs::metadata(&sub).unwrap().modified().unwrap());

    let resolver = TimestampResolver::new(LocalFileSystem::default());

    assert_eq!(resolver.resolve(sub.to_str().unwrap()), expected);
}
