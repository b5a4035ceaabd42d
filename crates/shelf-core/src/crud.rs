//! Generic create/read/update/delete service shared by every record family.
//!
//! Family services wrap a [`Crud`] and add their own checks; the policy that
//! differs between families (e.g. "only the author may edit") is passed to
//! [`Crud::update_guarded`] as a guard closure.

use std::{marker::PhantomData, sync::Arc};

use uuid::Uuid;

use crate::{
  Error, Result,
  store::{Entity, Repository},
};

/// A partial update. Only the fields present in the patch are written.
pub trait Patch<E> {
  fn apply(self, entity: &mut E);
}

pub struct Crud<R, E> {
  repo:    Arc<R>,
  _entity: PhantomData<fn() -> E>,
}

impl<R, E> Clone for Crud<R, E> {
  fn clone(&self) -> Self {
    Self { repo: self.repo.clone(), _entity: PhantomData }
  }
}

impl<R, E> Crud<R, E>
where
  R: Repository<E>,
  E: Entity,
{
  pub fn new(repo: Arc<R>) -> Self { Self { repo, _entity: PhantomData } }

  pub fn repo(&self) -> &R { &self.repo }

  pub async fn find(&self, id: Uuid) -> Result<Option<E>> {
    self.repo.get(id).await.map_err(Error::store)
  }

  /// Fetch a record, reporting absence as [`Error::NotFound`].
  pub async fn get(&self, id: Uuid) -> Result<E> {
    self.find(id).await?.ok_or(Error::NotFound(E::RESOURCE))
  }

  pub async fn exists(&self, id: Uuid) -> Result<bool> {
    Ok(self.find(id).await?.is_some())
  }

  pub async fn create(&self, entity: E) -> Result<E> {
    if self.exists(entity.id()).await? {
      return Err(Error::DuplicateId(E::RESOURCE));
    }
    self.repo.insert(entity.clone()).await.map_err(Error::store)?;
    Ok(entity)
  }

  pub async fn update<P>(&self, id: Uuid, patch: P) -> Result<E>
  where
    P: Patch<E> + Send,
  {
    self.update_guarded(id, patch, |_| Ok(())).await
  }

  /// Merge `patch` into the stored record after `guard` has approved it.
  ///
  /// Nothing is written when the record is missing or the guard refuses.
  pub async fn update_guarded<P, G>(&self, id: Uuid, patch: P, guard: G) -> Result<E>
  where
    P: Patch<E> + Send,
    G: FnOnce(&E) -> Result<()> + Send,
  {
    let mut entity = self.get(id).await?;
    guard(&entity)?;
    patch.apply(&mut entity);
    self.repo.replace(entity.clone()).await.map_err(Error::store)?;
    Ok(entity)
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> {
    if !self.exists(id).await? {
      return Err(Error::NotFound(E::RESOURCE));
    }
    self.repo.remove(id).await.map_err(Error::store)?;
    Ok(())
  }
}
