use std::sync::Arc;

use uuid::Uuid;
use validator::Validate as _;

use crate::{
  Error, Resource, Result,
  criteria::UserCriteria,
  crud::Crud,
  password::PasswordScheme,
  store::UserRepository,
  user::{InterestStatus, LoginCommand, Role, User, UserCommand, UserPatch, UserProfile, normalize},
  view::ProfileLookup,
};

/// Registration, profiles, interests and login.
///
/// Every public operation returns a [`UserProfile`]; the password hash never
/// leaves this service.
pub struct UserService<U, H> {
  users:     Crud<U, User>,
  passwords: Arc<H>,
}

impl<U, H> Clone for UserService<U, H> {
  fn clone(&self) -> Self {
    Self { users: self.users.clone(), passwords: self.passwords.clone() }
  }
}

impl<U, H> UserService<U, H>
where
  U: UserRepository,
  H: PasswordScheme,
{
  pub fn new(repo: Arc<U>, passwords: Arc<H>) -> Self {
    Self { users: Crud::new(repo), passwords }
  }

  async fn by_username_raw(&self, username: &str) -> Result<Option<User>> {
    self.users.repo().user_by_username(username).await.map_err(Error::store)
  }

  /// Register a user. Id, username and email are each probed for
  /// uniqueness, in that order, before the password is hashed.
  pub async fn create(&self, id: Uuid, command: UserCommand) -> Result<UserProfile> {
    command.validate()?;

    if self.users.exists(id).await? {
      return Err(Error::DuplicateId(Resource::User));
    }
    if self.by_username_raw(&normalize(&command.username)).await?.is_some() {
      return Err(Error::DuplicateUsername);
    }
    let email = normalize(&command.email);
    if self.users.repo().user_by_email(&email).await.map_err(Error::store)?.is_some() {
      return Err(Error::DuplicateEmail);
    }

    let hash = self.passwords.hash(&command.password)?;
    let user = User::new(id, command, hash);
    self.users.repo().insert(user.clone()).await.map_err(Error::store)?;
    Ok(user.profile())
  }

  /// Merge-patch name and username. A new username must not belong to
  /// someone else.
  pub async fn update(&self, id: Uuid, patch: UserPatch) -> Result<UserProfile> {
    patch.validate()?;
    if let Some(username) = patch.username.as_deref()
      && let Some(other) = self.by_username_raw(&normalize(username)).await?
      && other.id != id
    {
      return Err(Error::DuplicateUsername);
    }
    Ok(self.users.update(id, patch).await?.profile())
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> { self.users.delete(id).await }

  pub async fn get(&self, id: Uuid) -> Result<UserProfile> {
    Ok(self.users.get(id).await?.profile())
  }

  /// Case-insensitive exact username lookup.
  pub async fn by_username(&self, username: &str) -> Result<UserProfile> {
    self
      .by_username_raw(&normalize(username))
      .await?
      .map(|u| u.profile())
      .ok_or(Error::NotFound(Resource::Username))
  }

  pub async fn find(&self, criteria: &UserCriteria) -> Result<Vec<UserProfile>> {
    let users = self.users.repo().list_users(criteria).await.map_err(Error::store)?;
    Ok(users.iter().map(User::profile).collect())
  }

  pub async fn all(&self) -> Result<Vec<UserProfile>> {
    let users = self.users.repo().all_users().await.map_err(Error::store)?;
    Ok(users.iter().map(User::profile).collect())
  }

  /// Record the user's status for a book. Whether the book exists is the
  /// caller's concern.
  pub async fn set_interest(
    &self,
    user_id: Uuid,
    book_id: Uuid,
    status: InterestStatus,
  ) -> Result<UserProfile> {
    self.users.get(user_id).await?;
    self.users.repo().set_interest(user_id, book_id, status).await.map_err(Error::store)?;
    self.get(user_id).await
  }

  pub async fn remove_interest(&self, user_id: Uuid, book_id: Uuid) -> Result<UserProfile> {
    self.users.get(user_id).await?;
    self.users.repo().unset_interest(user_id, book_id).await.map_err(Error::store)?;
    self.get(user_id).await
  }

  pub async fn set_role(&self, user_id: Uuid, role: Role) -> Result<UserProfile> {
    self.users.get(user_id).await?;
    self.users.repo().set_role(user_id, role).await.map_err(Error::store)?;
    self.get(user_id).await
  }

  /// Check credentials. Unknown emails and wrong passwords are reported
  /// differently.
  pub async fn login(&self, command: LoginCommand) -> Result<UserProfile> {
    let email = normalize(&command.email);
    let user = self
      .users
      .repo()
      .user_by_email(&email)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotFound(Resource::Email))?;

    if !self.passwords.verify(&command.password, &user.password_hash) {
      return Err(Error::InvalidCredentials);
    }
    Ok(user.profile())
  }
}

impl<U, H> ProfileLookup for UserService<U, H>
where
  U: UserRepository,
  H: PasswordScheme,
{
  async fn profile(&self, id: Uuid) -> Result<UserProfile> { self.get(id).await }
}
