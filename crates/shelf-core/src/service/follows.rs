use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Resource, Result,
  crud::Crud,
  follow::UserFollow,
  store::{FollowRepository, Repository},
  user::User,
};

/// The follow graph. Self-follows are refused by the transport, not here.
pub struct FollowService<F, U> {
  follows: Arc<F>,
  users:   Crud<U, User>,
}

impl<F, U> Clone for FollowService<F, U> {
  fn clone(&self) -> Self {
    Self { follows: self.follows.clone(), users: self.users.clone() }
  }
}

impl<F, U> FollowService<F, U>
where
  F: FollowRepository,
  U: Repository<User>,
{
  pub fn new(follows: Arc<F>, users: Arc<U>) -> Self {
    Self { follows, users: Crud::new(users) }
  }

  async fn require_user(&self, id: Uuid) -> Result<()> {
    if self.users.exists(id).await? {
      Ok(())
    } else {
      Err(Error::NotFound(Resource::User))
    }
  }

  /// `from` starts following `to`.
  ///
  /// Following someone twice returns the existing edge and writes nothing.
  pub async fn follow(&self, from: Uuid, to: Uuid) -> Result<UserFollow> {
    self.require_user(to).await?;
    if let Some(existing) = self.follows.find_follow(from, to).await.map_err(Error::store)? {
      return Ok(existing);
    }
    let edge = UserFollow::new(from, to);
    self.follows.follow(edge.clone()).await.map_err(Error::store)?;
    Ok(edge)
  }

  /// Drop the edge `from -> to`. A missing edge is not an error; a missing
  /// target user is.
  pub async fn unfollow(&self, from: Uuid, to: Uuid) -> Result<()> {
    self.require_user(to).await?;
    self.follows.unfollow(from, to).await.map_err(Error::store)?;
    Ok(())
  }

  pub async fn followers(&self, id: Uuid) -> Result<Vec<UserFollow>> {
    self.require_user(id).await?;
    self.follows.followers(id).await.map_err(Error::store)
  }

  pub async fn following(&self, id: Uuid) -> Result<Vec<UserFollow>> {
    self.require_user(id).await?;
    self.follows.following(id).await.map_err(Error::store)
  }
}
