use serde::{Deserialize, Serialize};

use crate::traits::StatSource;

pub(crate) const S_IFMT: u32 = 0o170000;
pub(crate) const S_IFSOCK: u32 = 0o140000;
pub(crate) const S_IFLNK: u32 = 0o120000;
pub(crate) const S_IFREG: u32 = 0o100000;
pub(crate) const S_IFBLK: u32 = 0o060000;
pub(crate) const S_IFDIR: u32 = 0o040000;
pub(crate) const S_IFCHR: u32 = 0o020000;
pub(crate) const S_IFIFO: u32 = 0o010000;

pub(crate) const S_ISUID: u32 = 0o4000;
pub(crate) const S_ISGID: u32 = 0o2000;
pub(crate) const S_ISVTX: u32 = 0o1000;
pub(crate) const S_IRUSR: u32 = 0o400;
pub(crate) const S_IWUSR: u32 = 0o200;
pub(crate) const S_IXUSR: u32 = 0o100;
pub(crate) const S_IRGRP: u32 = 0o040;
pub(crate) const S_IWGRP: u32 = 0o020;
pub(crate) const S_IXGRP: u32 = 0o010;
pub(crate) const S_IROTH: u32 = 0o004;
pub(crate) const S_IWOTH: u32 = 0o002;
pub(crate) const S_IXOTH: u32 = 0o001;
pub(crate) const S_IALLUGO: u32 = 0o7777;

/// Credential fields a condition can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CredAttr {
    Uid,
    Euid,
    Suid,
    Fsuid,
    Gid,
    Egid,
    Sgid,
    Fsgid,
    Pid,
    Ppid,
}

/// Stat sub-fields a condition can test on a path slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum StatAttr {
    Uid,
    Gid,
    Ino,
    Major,
    Minor,
    Type,
    DevMajor,
    DevMinor,
    Perm,
}

/// Snapshot of the calling task's credentials, captured by the hosting
/// layer before evaluation starts. Read-only to this library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCredentials {
    pub uid: u32,
    pub euid: u32,
    pub suid: u32,
    pub fsuid: u32,
    pub gid: u32,
    pub egid: u32,
    pub sgid: u32,
    pub fsgid: u32,
    pub pid: u32,
    pub ppid: u32,
}

impl TaskCredentials {
    pub(crate) fn value(&self, attr: CredAttr) -> u64 {
        let value = match attr {
            CredAttr::Uid => self.uid,
            CredAttr::Euid => self.euid,
            CredAttr::Suid => self.suid,
            CredAttr::Fsuid => self.fsuid,
            CredAttr::Gid => self.gid,
            CredAttr::Egid => self.egid,
            CredAttr::Sgid => self.sgid,
            CredAttr::Fsgid => self.fsgid,
            CredAttr::Pid => self.pid,
            CredAttr::Ppid => self.ppid,
        };
        u64::from(value)
    }
}

/// A device number split into its major and minor halves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceNumber {
    pub major: u32,
    pub minor: u32,
}

impl DeviceNumber {
    pub fn new(major: u32, minor: u32) -> Self {
        DeviceNumber { major, minor }
    }
}

/// The inode attributes a condition can test, captured at most once per
/// request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniStat {
    pub uid: u32,
    pub gid: u32,
    pub ino: u64,
    pub mode: u32,
    pub dev: DeviceNumber,
    pub rdev: DeviceNumber,
}

impl MiniStat {
    pub(crate) fn value(&self, attr: StatAttr) -> u64 {
        match attr {
            StatAttr::Uid => u64::from(self.uid),
            StatAttr::Gid => u64::from(self.gid),
            StatAttr::Ino => self.ino,
            StatAttr::Major => u64::from(self.dev.major),
            StatAttr::Minor => u64::from(self.dev.minor),
            StatAttr::Type => u64::from(self.mode & S_IFMT),
            StatAttr::DevMajor => u64::from(self.rdev.major),
            StatAttr::DevMinor => u64::from(self.rdev.minor),
            StatAttr::Perm => u64::from(self.mode & S_IALLUGO),
        }
    }
}

/// Stat slots a request carries. The first four are addressable from
/// condition keywords; the last two hold secondary path arguments for
/// hosting layers that pass more than two paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSlot {
    Path1,
    Path1Parent,
    Path2,
    Path2Parent,
    Path3,
    Path4,
}

pub(crate) const MAX_PATH_STAT: usize = 6;

impl PathSlot {
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// The path arguments of a pending request plus their lazily captured
/// metadata.
#[derive(Default)]
pub struct ObjectInfo {
    path1: Option<Box<dyn StatSource>>,
    path2: Option<Box<dyn StatSource>>,
    path3: Option<Box<dyn StatSource>>,
    path4: Option<Box<dyn StatSource>>,
    stat: [Option<MiniStat>; MAX_PATH_STAT],
    validated: bool,
}

impl ObjectInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path1(mut self, source: impl StatSource + 'static) -> Self {
        self.path1 = Some(Box::new(source));
        self
    }

    pub fn with_path2(mut self, source: impl StatSource + 'static) -> Self {
        self.path2 = Some(Box::new(source));
        self
    }

    pub fn with_path3(mut self, source: impl StatSource + 'static) -> Self {
        self.path3 = Some(Box::new(source));
        self
    }

    pub fn with_path4(mut self, source: impl StatSource + 'static) -> Self {
        self.path4 = Some(Box::new(source));
        self
    }

    /// Capture metadata for every present path argument. Runs at most once
    /// per request; later calls are no-ops. Slots without a path argument
    /// stay invalid and clauses referencing them fail.
    pub fn revalidate(&mut self) {
        if self.validated {
            return;
        }
        self.validated = true;
        if let Some(path) = &self.path1 {
            self.stat[PathSlot::Path1.index()] = path.stat();
            self.stat[PathSlot::Path1Parent.index()] = path.parent_stat();
        }
        if let Some(path) = &self.path2 {
            self.stat[PathSlot::Path2.index()] = path.stat();
            self.stat[PathSlot::Path2Parent.index()] = path.parent_stat();
        }
        if let Some(path) = &self.path3 {
            self.stat[PathSlot::Path3.index()] = path.stat();
        }
        if let Some(path) = &self.path4 {
            self.stat[PathSlot::Path4.index()] = path.stat();
        }
    }

    /// The captured snapshot for a slot, if the slot resolved.
    pub fn stat(&self, slot: PathSlot) -> Option<&MiniStat> {
        self.stat[slot.index()].as_ref()
    }
}

/// A `StatSource` over snapshots captured ahead of time, for hosting layers
/// that stat eagerly.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedStat {
    stat: MiniStat,
    parent: Option<MiniStat>,
}

impl FixedStat {
    pub fn new(stat: MiniStat) -> Self {
        FixedStat { stat, parent: None }
    }

    pub fn with_parent(mut self, parent: MiniStat) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl StatSource for FixedStat {
    fn stat(&self) -> Option<MiniStat> {
        Some(self.stat)
    }

    fn parent_stat(&self) -> Option<MiniStat> {
        self.parent
    }
}

/// Everything about one pending access request a condition can look at.
/// Created per request, evaluated by one thread, discarded after.
#[derive(Default)]
pub struct RequestInfo {
    pub creds: TaskCredentials,
    pub obj: ObjectInfo,
}

impl RequestInfo {
    pub fn new(creds: TaskCredentials) -> Self {
        RequestInfo {
            creds,
            obj: ObjectInfo::new(),
        }
    }

    pub fn with_object(mut self, obj: ObjectInfo) -> Self {
        self.obj = obj;
        self
    }
}
