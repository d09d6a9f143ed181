use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::request::{
    CredAttr, PathSlot, S_IFBLK, S_IFCHR, S_IFDIR, S_IFIFO, S_IFLNK, S_IFREG, S_IFSOCK, S_IRGRP,
    S_IROTH, S_IRUSR, S_ISGID, S_ISUID, S_ISVTX, S_IWGRP, S_IWOTH, S_IWUSR, S_IXGRP, S_IXOTH,
    S_IXUSR, StatAttr,
};

/// Every symbolic operand the condition grammar recognizes. The `strum`
/// spellings are the wire form; a word that parses as none of these is a
/// numeric literal or group reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum Keyword {
    #[strum(serialize = "task.uid")]
    TaskUid,
    #[strum(serialize = "task.euid")]
    TaskEuid,
    #[strum(serialize = "task.suid")]
    TaskSuid,
    #[strum(serialize = "task.fsuid")]
    TaskFsuid,
    #[strum(serialize = "task.gid")]
    TaskGid,
    #[strum(serialize = "task.egid")]
    TaskEgid,
    #[strum(serialize = "task.sgid")]
    TaskSgid,
    #[strum(serialize = "task.fsgid")]
    TaskFsgid,
    #[strum(serialize = "task.pid")]
    TaskPid,
    #[strum(serialize = "task.ppid")]
    TaskPpid,

    #[strum(serialize = "socket")]
    Socket,
    #[strum(serialize = "symlink")]
    Symlink,
    #[strum(serialize = "file")]
    File,
    #[strum(serialize = "block")]
    Block,
    #[strum(serialize = "directory")]
    Directory,
    #[strum(serialize = "char")]
    Char,
    #[strum(serialize = "fifo")]
    Fifo,

    #[strum(serialize = "S_ISUID")]
    Setuid,
    #[strum(serialize = "S_ISGID")]
    Setgid,
    #[strum(serialize = "S_ISVTX")]
    Sticky,
    #[strum(serialize = "S_IRUSR")]
    OwnerRead,
    #[strum(serialize = "S_IWUSR")]
    OwnerWrite,
    #[strum(serialize = "S_IXUSR")]
    OwnerExecute,
    #[strum(serialize = "S_IRGRP")]
    GroupRead,
    #[strum(serialize = "S_IWGRP")]
    GroupWrite,
    #[strum(serialize = "S_IXGRP")]
    GroupExecute,
    #[strum(serialize = "S_IROTH")]
    OthersRead,
    #[strum(serialize = "S_IWOTH")]
    OthersWrite,
    #[strum(serialize = "S_IXOTH")]
    OthersExecute,

    #[strum(serialize = "path1.uid")]
    Path1Uid,
    #[strum(serialize = "path1.gid")]
    Path1Gid,
    #[strum(serialize = "path1.ino")]
    Path1Ino,
    #[strum(serialize = "path1.major")]
    Path1Major,
    #[strum(serialize = "path1.minor")]
    Path1Minor,
    #[strum(serialize = "path1.type")]
    Path1Type,
    #[strum(serialize = "path1.dev_major")]
    Path1DevMajor,
    #[strum(serialize = "path1.dev_minor")]
    Path1DevMinor,
    #[strum(serialize = "path1.perm")]
    Path1Perm,

    #[strum(serialize = "path2.uid")]
    Path2Uid,
    #[strum(serialize = "path2.gid")]
    Path2Gid,
    #[strum(serialize = "path2.ino")]
    Path2Ino,
    #[strum(serialize = "path2.major")]
    Path2Major,
    #[strum(serialize = "path2.minor")]
    Path2Minor,
    #[strum(serialize = "path2.type")]
    Path2Type,
    #[strum(serialize = "path2.dev_major")]
    Path2DevMajor,
    #[strum(serialize = "path2.dev_minor")]
    Path2DevMinor,
    #[strum(serialize = "path2.perm")]
    Path2Perm,

    #[strum(serialize = "path1.parent.uid")]
    Path1ParentUid,
    #[strum(serialize = "path1.parent.gid")]
    Path1ParentGid,
    #[strum(serialize = "path1.parent.ino")]
    Path1ParentIno,
    #[strum(serialize = "path1.parent.major")]
    Path1ParentMajor,
    #[strum(serialize = "path1.parent.minor")]
    Path1ParentMinor,
    #[strum(serialize = "path1.parent.type")]
    Path1ParentType,
    #[strum(serialize = "path1.parent.dev_major")]
    Path1ParentDevMajor,
    #[strum(serialize = "path1.parent.dev_minor")]
    Path1ParentDevMinor,
    #[strum(serialize = "path1.parent.perm")]
    Path1ParentPerm,

    #[strum(serialize = "path2.parent.uid")]
    Path2ParentUid,
    #[strum(serialize = "path2.parent.gid")]
    Path2ParentGid,
    #[strum(serialize = "path2.parent.ino")]
    Path2ParentIno,
    #[strum(serialize = "path2.parent.major")]
    Path2ParentMajor,
    #[strum(serialize = "path2.parent.minor")]
    Path2ParentMinor,
    #[strum(serialize = "path2.parent.type")]
    Path2ParentType,
    #[strum(serialize = "path2.parent.dev_major")]
    Path2ParentDevMajor,
    #[strum(serialize = "path2.parent.dev_minor")]
    Path2ParentDevMinor,
    #[strum(serialize = "path2.parent.perm")]
    Path2ParentPerm,
}

/// How a keyword resolves at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeywordClass {
    /// A field of the calling task's credentials.
    Cred(CredAttr),
    /// A file-type constant, compared by range like any other value.
    TypeTest(u32),
    /// A single permission bit, compared by bitwise AND.
    BitTest(u32),
    /// A stat sub-field of one of the four addressable path slots.
    Stat(PathSlot, StatAttr),
}

impl Keyword {
    pub(crate) fn class(self) -> KeywordClass {
        use Keyword::*;
        use KeywordClass::*;
        match self {
            TaskUid => Cred(CredAttr::Uid),
            TaskEuid => Cred(CredAttr::Euid),
            TaskSuid => Cred(CredAttr::Suid),
            TaskFsuid => Cred(CredAttr::Fsuid),
            TaskGid => Cred(CredAttr::Gid),
            TaskEgid => Cred(CredAttr::Egid),
            TaskSgid => Cred(CredAttr::Sgid),
            TaskFsgid => Cred(CredAttr::Fsgid),
            TaskPid => Cred(CredAttr::Pid),
            TaskPpid => Cred(CredAttr::Ppid),

            Socket => TypeTest(S_IFSOCK),
            Symlink => TypeTest(S_IFLNK),
            File => TypeTest(S_IFREG),
            Block => TypeTest(S_IFBLK),
            Directory => TypeTest(S_IFDIR),
            Char => TypeTest(S_IFCHR),
            Fifo => TypeTest(S_IFIFO),

            Setuid => BitTest(S_ISUID),
            Setgid => BitTest(S_ISGID),
            Sticky => BitTest(S_ISVTX),
            OwnerRead => BitTest(S_IRUSR),
            OwnerWrite => BitTest(S_IWUSR),
            OwnerExecute => BitTest(S_IXUSR),
            GroupRead => BitTest(S_IRGRP),
            GroupWrite => BitTest(S_IWGRP),
            GroupExecute => BitTest(S_IXGRP),
            OthersRead => BitTest(S_IROTH),
            OthersWrite => BitTest(S_IWOTH),
            OthersExecute => BitTest(S_IXOTH),

            Path1Uid => Stat(PathSlot::Path1, StatAttr::Uid),
            Path1Gid => Stat(PathSlot::Path1, StatAttr::Gid),
            Path1Ino => Stat(PathSlot::Path1, StatAttr::Ino),
            Path1Major => Stat(PathSlot::Path1, StatAttr::Major),
            Path1Minor => Stat(PathSlot::Path1, StatAttr::Minor),
            Path1Type => Stat(PathSlot::Path1, StatAttr::Type),
            Path1DevMajor => Stat(PathSlot::Path1, StatAttr::DevMajor),
            Path1DevMinor => Stat(PathSlot::Path1, StatAttr::DevMinor),
            Path1Perm => Stat(PathSlot::Path1, StatAttr::Perm),

            Path2Uid => Stat(PathSlot::Path2, StatAttr::Uid),
            Path2Gid => Stat(PathSlot::Path2, StatAttr::Gid),
            Path2Ino => Stat(PathSlot::Path2, StatAttr::Ino),
            Path2Major => Stat(PathSlot::Path2, StatAttr::Major),
            Path2Minor => Stat(PathSlot::Path2, StatAttr::Minor),
            Path2Type => Stat(PathSlot::Path2, StatAttr::Type),
            Path2DevMajor => Stat(PathSlot::Path2, StatAttr::DevMajor),
            Path2DevMinor => Stat(PathSlot::Path2, StatAttr::DevMinor),
            Path2Perm => Stat(PathSlot::Path2, StatAttr::Perm),

            Path1ParentUid => Stat(PathSlot::Path1Parent, StatAttr::Uid),
            Path1ParentGid => Stat(PathSlot::Path1Parent, StatAttr::Gid),
            Path1ParentIno => Stat(PathSlot::Path1Parent, StatAttr::Ino),
            Path1ParentMajor => Stat(PathSlot::Path1Parent, StatAttr::Major),
            Path1ParentMinor => Stat(PathSlot::Path1Parent, StatAttr::Minor),
            Path1ParentType => Stat(PathSlot::Path1Parent, StatAttr::Type),
            Path1ParentDevMajor => Stat(PathSlot::Path1Parent, StatAttr::DevMajor),
            Path1ParentDevMinor => Stat(PathSlot::Path1Parent, StatAttr::DevMinor),
            Path1ParentPerm => Stat(PathSlot::Path1Parent, StatAttr::Perm),

            Path2ParentUid => Stat(PathSlot::Path2Parent, StatAttr::Uid),
            Path2ParentGid => Stat(PathSlot::Path2Parent, StatAttr::Gid),
            Path2ParentIno => Stat(PathSlot::Path2Parent, StatAttr::Ino),
            Path2ParentMajor => Stat(PathSlot::Path2Parent, StatAttr::Major),
            Path2ParentMinor => Stat(PathSlot::Path2Parent, StatAttr::Minor),
            Path2ParentType => Stat(PathSlot::Path2Parent, StatAttr::Type),
            Path2ParentDevMajor => Stat(PathSlot::Path2Parent, StatAttr::DevMajor),
            Path2ParentDevMinor => Stat(PathSlot::Path2Parent, StatAttr::DevMinor),
            Path2ParentPerm => Stat(PathSlot::Path2Parent, StatAttr::Perm),
        }
    }
}

/// Every keyword spelling the parser recognizes, sorted. Handy for policy
/// tooling and diagnostics.
pub fn keyword_table() -> Vec<String> {
    Keyword::iter().map(|keyword| keyword.to_string()).sorted().collect()
}
