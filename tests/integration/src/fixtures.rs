//! Seed data for integration tests

use parley_core::{User, UserId};
use parley_memstore::MemoryDirectory;

/// The standard cast used across scenarios
#[derive(Debug, Clone, Copy)]
pub struct Cast {
    pub alice: UserId,
    pub bob: UserId,
    pub carol: UserId,
    pub dave: UserId,
}

/// Seed the user directory with the standard cast
pub fn seed_users(directory: &MemoryDirectory) -> Cast {
    let cast = Cast {
        alice: UserId::new(1),
        bob: UserId::new(2),
        carol: UserId::new(3),
        dave: UserId::new(4),
    };

    directory.insert_user(User::new(cast.alice, "alice".to_string()));
    directory.insert_user(User::new(cast.bob, "bob".to_string()));
    directory.insert_user(User::new(cast.carol, "carol".to_string()));
    directory.insert_user(User::new(cast.dave, "dave".to_string()));

    cast
}
