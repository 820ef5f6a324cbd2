use std::io::Write;
use std::os::unix::fs::PermissionsExt;

use libos::{OpenRequest, fstat, open, stat};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::stat::{Mode, umask};
use serial_test::serial;

fn permissions(path: &std::path::Path) -> u32 {
    std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}

#[test]
#[serial(umask)]
fn test_create_applies_mode_minus_umask() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let old = umask(Mode::from_bits_truncate(0o027));

    let path = dir.path().join("pool");
    let fd = open(
        &path,
        OpenRequest::create(OFlag::O_RDWR, Mode::from_bits_truncate(0o666)),
    );
    umask(old);

    drop(fd?);
    assert_eq!(permissions(&path), 0o640);
    Ok(())
}

#[test]
#[serial(umask)]
fn test_create_from_raw_flags() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let old = umask(Mode::from_bits_truncate(0o022));

    let path = dir.path().join("pool");
    let req = OpenRequest::from_flags(OFlag::O_RDWR | OFlag::O_CREAT | OFlag::O_EXCL, Some(0o600))?;
    let fd = open(&path, req);
    umask(old);

    drop(fd?);
    assert_eq!(permissions(&path), 0o600);

    // O_EXCL on an existing file is the native error, unchanged
    let req = OpenRequest::from_flags(OFlag::O_RDWR | OFlag::O_CREAT | OFlag::O_EXCL, Some(0o600))?;
    assert_eq!(open(&path, req).err(), Some(Errno::EEXIST));
    Ok(())
}

#[test]
fn test_plain_open_ignores_supplied_mode() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pool");
    std::fs::write(&path, b"")?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;

    // a sentinel mode that would be visible if it were ever applied
    let req = OpenRequest::from_flags(OFlag::O_RDWR, Some(0o777))?;
    let fd = open(&path, req)?;
    drop(fd);
    assert_eq!(permissions(&path), 0o600);
    Ok(())
}

#[test]
fn test_plain_open_of_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let res = open(&dir.path().join("missing"), OpenRequest::plain(OFlag::O_RDONLY));
    assert_eq!(res.err(), Some(Errno::ENOENT));
}

#[test]
fn test_write_then_stat_reports_size() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pool");
    let fd = open(
        &path,
        OpenRequest::create(OFlag::O_WRONLY | OFlag::O_TRUNC, Mode::S_IRUSR | Mode::S_IWUSR),
    )?;

    let mut file = std::fs::File::from(fd);
    file.write_all(&[0xa5; 12345])?;
    file.flush()?;

    assert_eq!(stat(&path)?.st_size, 12345);
    assert_eq!(fstat(&file)?.st_size, 12345);
    Ok(())
}

#[cfg(target_os = "linux")]
#[test]
fn test_tmpfile_has_no_name() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let req = OpenRequest::tmpfile(OFlag::O_RDWR, Mode::S_IRUSR | Mode::S_IWUSR);
    let fd = match open(dir.path(), req) {
        Ok(fd) => fd,
        // not every filesystem supports unnamed temporary files
        Err(Errno::EOPNOTSUPP) | Err(Errno::EISDIR) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let mut file = std::fs::File::from(fd);
    file.write_all(b"scratch")?;
    assert_eq!(fstat(&file)?.st_size, 7);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}
