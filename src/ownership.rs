//! The single authorization predicate shared by accounts and transactions.

use crate::{Error, UserID};

/// A record that belongs to exactly one user.
pub trait Owned {
    /// The user that owns the record.
    fn owner(&self) -> UserID;
}

/// Check that `entity` exists and is owned by `user_id`.
///
/// Both a missing entity and an entity owned by another user produce
/// [Error::NotAuthorized] so that callers cannot tell the two apart.
///
/// # Errors
/// Returns [Error::NotAuthorized] if `entity` is `None` or not owned by `user_id`.
pub fn assert_owned<T: Owned>(entity: Option<T>, user_id: UserID) -> Result<T, Error> {
    match entity {
        Some(entity) if entity.owner() == user_id => Ok(entity),
        Some(entity) => {
            tracing::debug!(
                "user {user_id} tried to access a record owned by user {}",
                entity.owner()
            );
            Err(Error::NotAuthorized)
        }
        None => Err(Error::NotAuthorized),
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, UserID};

    use super::{Owned, assert_owned};

    #[derive(Debug, PartialEq)]
    struct Thing(UserID);

    impl Owned for Thing {
        fn owner(&self) -> UserID {
            self.0
        }
    }

    #[test]
    fn owner_is_allowed() {
        let owner = UserID::new(1);

        assert_eq!(assert_owned(Some(Thing(owner)), owner), Ok(Thing(owner)));
    }

    #[test]
    fn other_user_is_rejected() {
        let result = assert_owned(Some(Thing(UserID::new(1))), UserID::new(2));

        assert_eq!(result, Err(Error::NotAuthorized));
    }

    #[test]
    fn missing_and_foreign_are_indistinguishable() {
        let missing = assert_owned::<Thing>(None, UserID::new(2));
        let foreign = assert_owned(Some(Thing(UserID::new(1))), UserID::new(2));

        assert_eq!(missing, foreign);
    }
}
