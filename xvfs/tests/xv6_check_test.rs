// SPDX-License-Identifier: MIT

use std::io::Write;

use xvfs::xv6::*;

type Injector<'a, 'b> = Xv6Injector<'a, MemXvIO<'b>>;

/// Formats a default-size image and lets `populate` fill it.
fn image(populate: impl FnOnce(&mut Injector<'_, '_>) -> FsInjectorResult) -> Vec<u8> {
    let meta = Xv6Meta::default();
    let mut buf = vec![0u8; meta.size_bytes() as usize];
    {
        let mut io = MemXvIO::new(&mut buf);
        Xv6Formatter::new(&mut io, &meta)
            .format(true)
            .expect("format failed");
        let mut inj = Xv6Injector::new(&mut io, &meta);
        populate(&mut inj).expect("populate failed");
    }
    buf
}

fn patch(buf: &mut [u8], f: impl FnOnce(&mut Injector<'_, '_>) -> FsInjectorResult) {
    let meta = Xv6Meta::default();
    let mut io = MemXvIO::new(buf);
    let mut inj = Xv6Injector::new(&mut io, &meta);
    f(&mut inj).expect("patch failed");
}

fn check_with(buf: &mut [u8], opt: &Xv6CheckOptions) -> FsCheckerResult<CheckReport> {
    let mut io = MemXvIO::new(buf);
    Xv6Checker::open(&mut io)?.check_with(opt)
}

fn check(buf: &mut [u8]) -> FsCheckerResult<CheckReport> {
    check_with(buf, &Xv6CheckOptions::default())
}

const ROOT_BLOCK: u32 = 59;

#[test]
fn test_minimal_root_image_is_consistent() {
    let mut buf = image(|_| Ok(()));
    let rep = check(&mut buf).expect("check failed");
    assert_eq!(rep.phases.len(), 5);
    assert!(!rep.has_warnings());

    let bitmap = rep.findings.iter().find(|f| f.code == "BITMAP");
    assert_eq!(
        bitmap.map(|f| f.msg.as_str()),
        Some("1 data blocks marked, 1 referenced")
    );
}

#[test]
fn test_populated_image_is_consistent() {
    let mut readme = 0;
    let mut buf = image(|inj| {
        let bin = inj.mkdir(XV6_ROOT_INO, b"bin")?;
        let usr = inj.mkdir(XV6_ROOT_INO, b"usr")?;
        let share = inj.mkdir(usr, b"share")?;
        inj.create_file(bin, b"sh", &[0x7fu8; 3000])?;
        inj.create_file(share, b"big", &vec![1u8; 40 * XV6_BLOCK_SIZE])?;
        readme = inj.create_file(XV6_ROOT_INO, b"README", b"xv6 is a re-implementation")?;
        inj.link(usr, b"README", readme)?;
        inj.create_file(XV6_ROOT_INO, b"empty", b"")?;
        inj.mknod(XV6_ROOT_INO, b"console", 1, 1)?;
        Ok(())
    });

    let mut io = MemXvIO::new(&mut buf);
    let mut checker = Xv6Checker::open(&mut io).expect("open failed");
    checker.check_all().expect("check failed");

    let stats = checker.stats();
    assert_eq!(stats.dirs_visited, 4);
    assert_eq!(stats.files_found, 5);
    assert_eq!(stats.max_depth, 2);
    assert_eq!(checker.inode_refs(readme), 2);
}

#[test]
fn test_many_entries_span_directory_blocks() {
    let mut buf = image(|inj| {
        for i in 0..70u32 {
            let name = format!("f{i}");
            inj.create_file(XV6_ROOT_INO, name.as_bytes(), b"x")?;
        }
        Ok(())
    });
    let mut io = MemXvIO::new(&mut buf);
    let mut checker = Xv6Checker::open(&mut io).expect("open failed");
    checker.check_all().expect("check failed");
    assert_eq!(checker.stats().entries_scanned, 70);
}

#[test]
fn test_stray_bitmap_bit() {
    let mut buf = image(|_| Ok(()));
    patch(&mut buf, |inj| inj.set_bitmap(500, true));
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::BitmapBlockUsedButFree { block: 500 }
    );
}

#[test]
fn test_bitmap_misses_file_block() {
    let mut inum = 0;
    let mut buf = image(|inj| {
        inum = inj.create_file(XV6_ROOT_INO, b"a", &[3u8; 1024])?;
        Ok(())
    });
    let mut block = 0;
    patch(&mut buf, |inj| {
        block = inj.read_inode(inum)?.addr(1);
        inj.set_bitmap(block, false)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::BitmapBlockFreedButUsed { inum, block }
    );
}

#[test]
fn test_bitmap_misses_indirect_entry() {
    let mut inum = 0;
    let mut buf = image(|inj| {
        inum = inj.create_file(XV6_ROOT_INO, b"big", &vec![9u8; 14 * XV6_BLOCK_SIZE])?;
        Ok(())
    });
    let mut block = 0;
    patch(&mut buf, |inj| {
        let ino = inj.read_inode(inum)?;
        let ind = inj.read_block(ino.indirect())?;
        block = indirect_entries(&ind).last().unwrap_or(0);
        inj.set_bitmap(block, false)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::BitmapBlockFreedButUsed { inum, block }
    );
}

#[test]
fn test_root_bitmap_check_is_optional() {
    let mut buf = image(|_| Ok(()));
    patch(&mut buf, |inj| inj.set_bitmap(ROOT_BLOCK, false));
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::BitmapBlockFreedButUsed {
            inum: XV6_ROOT_INO,
            block: ROOT_BLOCK
        }
    );

    let opt = Xv6CheckOptions {
        check_root_bitmap: false,
        ..Default::default()
    };
    assert!(check_with(&mut buf, &opt).is_ok());
}

#[test]
fn test_duplicate_direct_address_in_one_file() {
    let mut inum = 0;
    let mut buf = image(|inj| {
        inum = inj.create_file(XV6_ROOT_INO, b"twice", &[5u8; 1024])?;
        Ok(())
    });
    let mut block = 0;
    patch(&mut buf, |inj| {
        let mut ino = inj.read_inode(inum)?;
        block = ino.addr(0);
        ino.set_addr(1, block);
        inj.write_inode(inum, &ino)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::DuplicateBlockUse {
            inum,
            block,
            indirect: false
        }
    );
}

#[test]
fn test_block_shared_by_two_files() {
    let (mut a, mut b) = (0, 0);
    let mut buf = image(|inj| {
        a = inj.create_file(XV6_ROOT_INO, b"a", b"first")?;
        b = inj.create_file(XV6_ROOT_INO, b"b", b"second")?;
        Ok(())
    });
    let mut block = 0;
    patch(&mut buf, |inj| {
        block = inj.read_inode(a)?.addr(0);
        let mut ino = inj.read_inode(b)?;
        ino.set_addr(0, block);
        inj.write_inode(b, &ino)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::DuplicateBlockUse {
            inum: b,
            block,
            indirect: false
        }
    );
}

#[test]
fn test_indirect_entry_repeats_direct_block() {
    let mut inum = 0;
    let mut buf = image(|inj| {
        inum = inj.create_file(XV6_ROOT_INO, b"big", &vec![3u8; 14 * XV6_BLOCK_SIZE])?;
        Ok(())
    });
    let mut block = 0;
    patch(&mut buf, |inj| {
        let ino = inj.read_inode(inum)?;
        block = ino.addr(0);
        let mut ind = inj.read_block(ino.indirect())?;
        ind[4..8].copy_from_slice(&block.to_le_bytes());
        inj.write_block(ino.indirect(), &ind)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::DuplicateBlockUse {
            inum,
            block,
            indirect: true
        }
    );
}

#[test]
fn test_file_claims_directory_block() {
    let (mut dir, mut file) = (0, 0);
    let mut buf = image(|inj| {
        dir = inj.mkdir(XV6_ROOT_INO, b"d")?;
        file = inj.create_file(XV6_ROOT_INO, b"f", b"payload")?;
        Ok(())
    });
    let mut block = 0;
    patch(&mut buf, |inj| {
        block = inj.read_inode(dir)?.addr(0);
        let mut ino = inj.read_inode(file)?;
        ino.set_addr(0, block);
        inj.write_inode(file, &ino)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::DuplicateBlockUse {
            inum: file,
            block,
            indirect: false
        }
    );
}

#[test]
fn test_bad_direct_address() {
    let mut inum = 0;
    let mut buf = image(|inj| {
        inum = inj.create_file(XV6_ROOT_INO, b"a", b"data")?;
        Ok(())
    });
    for block in [10, 1000, u32::MAX] {
        patch(&mut buf, |inj| {
            let mut ino = inj.read_inode(inum)?;
            ino.set_addr(0, block);
            inj.write_inode(inum, &ino)
        });
        assert_eq!(
            check(&mut buf).unwrap_err(),
            FsCheckerError::BadBlockPointer {
                inum,
                block,
                indirect: false
            }
        );
    }
}

#[test]
fn test_bad_indirect_pointer_itself() {
    let mut inum = 0;
    let mut buf = image(|inj| {
        inum = inj.create_file(XV6_ROOT_INO, b"big", &vec![2u8; 13 * XV6_BLOCK_SIZE])?;
        Ok(())
    });
    patch(&mut buf, |inj| {
        let mut ino = inj.read_inode(inum)?;
        ino.set_addr(XV6_NDIRECT, 3);
        inj.write_inode(inum, &ino)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::BadBlockPointer {
            inum,
            block: 3,
            indirect: true
        }
    );
}

#[test]
fn test_root_dot_entry_missing() {
    let mut buf = image(|_| Ok(()));
    patch(&mut buf, |inj| {
        let bogus = Xv6Dirent::new(1, b"x").ok_or(FsInjectorError::NameTooLong)?;
        inj.write_dirent(ROOT_BLOCK, 0, &bogus)
    });
    assert!(matches!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::MalformedDirectory { inum: 1, .. }
    ));
}

#[test]
fn test_root_not_its_own_parent() {
    let mut buf = image(|inj| inj.mkdir(XV6_ROOT_INO, b"d").map(|_| ()));
    patch(&mut buf, |inj| {
        let dotdot = Xv6Dirent::new(2, b"..").ok_or(FsInjectorError::NameTooLong)?;
        inj.write_dirent(ROOT_BLOCK, 1, &dotdot)
    });
    let err = check(&mut buf).unwrap_err();
    assert!(matches!(err, FsCheckerError::MalformedDirectory { inum: 1, .. }));
    assert!(err.to_string().contains("not its own parent"));
}

#[test]
fn test_subdirectory_dot_names_wrong_inode() {
    let mut dir = 0;
    let mut buf = image(|inj| {
        dir = inj.mkdir(XV6_ROOT_INO, b"d")?;
        Ok(())
    });
    patch(&mut buf, |inj| {
        let block = inj.read_inode(dir)?.addr(0);
        let dot = Xv6Dirent::new(1, b".").ok_or(FsInjectorError::NameTooLong)?;
        inj.write_dirent(block, 0, &dot)
    });
    assert!(matches!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::MalformedDirectory { inum, .. } if inum == dir
    ));
}

#[test]
fn test_subdirectory_dotdot_missing() {
    let mut dir = 0;
    let mut buf = image(|inj| {
        dir = inj.mkdir(XV6_ROOT_INO, b"d")?;
        Ok(())
    });
    patch(&mut buf, |inj| {
        let block = inj.read_inode(dir)?.addr(0);
        let entry = Xv6Dirent::new(1, b"xx").ok_or(FsInjectorError::NameTooLong)?;
        inj.write_dirent(block, 1, &entry)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::MalformedDirectory {
            inum: dir,
            reason: "second entry is not '..'"
        }
    );
}

#[test]
fn test_directory_named_twice() {
    let mut a = 0;
    let mut buf = image(|inj| {
        a = inj.mkdir(XV6_ROOT_INO, b"a")?;
        let b = inj.mkdir(XV6_ROOT_INO, b"b")?;
        inj.add_entry(b, b"again", a)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::DuplicateDirectoryLink { inum: a }
    );
}

#[test]
fn test_directory_cycle_terminates() {
    let mut a = 0;
    let mut buf = image(|inj| {
        a = inj.mkdir(XV6_ROOT_INO, b"a")?;
        let b = inj.mkdir(a, b"b")?;
        inj.add_entry(b, b"loop", a)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::DuplicateDirectoryLink { inum: a }
    );
}

#[test]
fn test_entry_naming_root() {
    let mut buf = image(|inj| {
        let a = inj.mkdir(XV6_ROOT_INO, b"a")?;
        inj.add_entry(a, b"top", XV6_ROOT_INO)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::DuplicateDirectoryLink { inum: XV6_ROOT_INO }
    );
}

#[test]
fn test_link_count_mismatch() {
    let mut inum = 0;
    let mut buf = image(|inj| {
        inum = inj.create_file(XV6_ROOT_INO, b"a", b"data")?;
        Ok(())
    });
    patch(&mut buf, |inj| {
        let mut ino = inj.read_inode(inum)?;
        ino.set_nlink(2);
        inj.write_inode(inum, &ino)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::LinkCountMismatch {
            inum,
            nlink: 2,
            refs: 1
        }
    );
}

#[test]
fn test_unreferenced_live_inode() {
    let mut inum = 0;
    let mut buf = image(|inj| {
        inum = inj.alloc_inode(InodeType::File)?;
        Ok(())
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::UnreferencedLiveInode { inum }
    );
}

#[test]
fn test_zero_entry_ends_block() {
    let mut b = 0;
    let mut buf = image(|inj| {
        let d = inj.mkdir(XV6_ROOT_INO, b"d")?;
        inj.create_file(d, b"a", b"1")?;
        b = inj.create_file(XV6_ROOT_INO, b"b", b"2")?;
        Ok(())
    });
    assert!(check(&mut buf).is_ok());

    // move "b" one slot down, behind an unused slot
    patch(&mut buf, |inj| {
        let entry = Xv6Dirent::new(b as u16, b"b").ok_or(FsInjectorError::NameTooLong)?;
        inj.write_dirent(ROOT_BLOCK, 3, &Xv6Dirent::default())?;
        inj.write_dirent(ROOT_BLOCK, 4, &entry)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::UnreferencedLiveInode { inum: b }
    );
}

#[test]
fn test_entry_naming_free_inode() {
    let mut buf = image(|inj| inj.add_entry(XV6_ROOT_INO, b"ghost", 9));
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::InvalidInodeType { inum: 9, raw: 0 }
    );
}

#[test]
fn test_bad_type_tag() {
    let mut inum = 0;
    let mut buf = image(|inj| {
        inum = inj.create_file(XV6_ROOT_INO, b"a", b"")?;
        Ok(())
    });
    patch(&mut buf, |inj| {
        let mut ino = inj.read_inode(inum)?;
        ino.kind = zerocopy::little_endian::I16::new(7);
        inj.write_inode(inum, &ino)
    });
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::InvalidInodeType { inum, raw: 7 }
    );
}

#[test]
fn test_entry_past_inode_table() {
    let mut buf = image(|inj| inj.add_entry(XV6_ROOT_INO, b"far", 500));
    assert_eq!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::InodeOutOfRange {
            inum: 500,
            ninodes: XV6_DEFAULT_NINODES
        }
    );
}

#[test]
fn test_depth_guard() {
    let mut buf = image(|inj| {
        let mut parent = XV6_ROOT_INO;
        for _ in 0..5 {
            parent = inj.mkdir(parent, b"d")?;
        }
        Ok(())
    });
    assert!(check(&mut buf).is_ok());

    let opt = Xv6CheckOptions {
        max_depth: 3,
        ..Default::default()
    };
    assert!(matches!(
        check_with(&mut buf, &opt).unwrap_err(),
        FsCheckerError::DirectoryTooDeep { limit: 3, .. }
    ));
}

#[test]
fn test_zero_inodes_is_layout_error() {
    let mut buf = image(|_| Ok(()));
    {
        let mut io = MemXvIO::new(&mut buf);
        io.write_u32_at(XV6_BLOCK_SIZE as u64 + 8, 0).unwrap();
    }
    assert!(matches!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::Layout(_)
    ));
}

#[test]
fn test_nblocks_mismatch_is_a_warning() {
    let mut buf = image(|_| Ok(()));
    {
        let mut io = MemXvIO::new(&mut buf);
        io.write_u32_at(XV6_BLOCK_SIZE as u64 + 4, 5).unwrap();
    }
    let rep = check(&mut buf).expect("check failed");
    assert!(rep.has_warnings());
    assert!(rep.findings.iter().any(|f| f.code == "SB.NBLK"));
}

#[test]
fn test_truncated_image() {
    let mut buf = image(|_| Ok(()));
    buf.truncate(30 * XV6_BLOCK_SIZE);
    assert!(matches!(
        check(&mut buf).unwrap_err(),
        FsCheckerError::IO(_)
    ));
}

#[test]
fn test_file_backed_image() {
    let mut buf = image(|inj| inj.mkdir(XV6_ROOT_INO, b"home").map(|_| ()));
    let mut file = tempfile::tempfile().expect("tempfile failed");
    file.write_all(&buf).expect("write failed");

    let mut io = StdXvIO::new(&mut file);
    let rep = Xv6Checker::open(&mut io)
        .and_then(|mut c| c.check_all())
        .expect("check failed");
    assert!(!rep.has_warnings());

    patch(&mut buf, |inj| inj.set_bitmap(700, true));
    let mut file = tempfile::tempfile().expect("tempfile failed");
    file.write_all(&buf).expect("write failed");
    let mut io = StdXvIO::new(&mut file);
    let err = Xv6Checker::open(&mut io)
        .and_then(|mut c| c.check_all())
        .unwrap_err();
    assert_eq!(err, FsCheckerError::BitmapBlockUsedButFree { block: 700 });
}
