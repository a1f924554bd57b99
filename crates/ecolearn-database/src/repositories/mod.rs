//! Repository implementations for the profile tables.

pub mod ngo_profile;
pub mod profile;
pub mod teacher_profile;

pub use ngo_profile::NgoProfileRepository;
pub use profile::ProfileRepository;
pub use teacher_profile::TeacherProfileRepository;
