use crate::error::AppError;
use crate::models::{Task, User};

/// Anything with a single owning identity.
pub trait Owned {
    fn owner_id(&self) -> i64;
    fn kind() -> &'static str;
}

impl Owned for Task {
    fn owner_id(&self) -> i64 {
        self.owner
    }

    fn kind() -> &'static str {
        "task"
    }
}

/// An identity owns itself.
impl Owned for User {
    fn owner_id(&self) -> i64 {
        self.id
    }

    fn kind() -> &'static str {
        "user"
    }
}

/// Checks that `resource` exists and belongs to `caller`, handing it back on success.
///
/// Must run after the lookup and before any write. Callers that mutate do the lookup,
/// this check and the write inside one transaction.
pub fn assert_owner<R: Owned>(resource: Option<R>, caller: i64) -> Result<R, AppError> {
    let resource = resource.ok_or_else(|| AppError::NotFound(format!("{} not found", R::kind())))?;
    if resource.owner_id() != caller {
        return Err(AppError::Forbidden(format!(
            "You do not have permission to edit this {}",
            R::kind()
        )));
    }
    Ok(resource)
}
