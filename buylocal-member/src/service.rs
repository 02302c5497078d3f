use std::sync::Arc;

use buylocal_core::Repository;
use tracing::{debug, info, instrument};

use crate::error::{MemberError, Result};
use crate::models::{AuthType, Member};

/// Member lookup and sign-in bookkeeping.
#[derive(Clone)]
pub struct MemberService {
    repository: Arc<dyn Repository<Member>>,
}

impl MemberService {
    pub fn new(repository: Arc<dyn Repository<Member>>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn find(&self, member_id: i64) -> Result<Member> {
        self.repository
            .find_by_id(member_id)
            .await?
            .ok_or(MemberError::NotFound(member_id))
    }

    /// Usernames are unique per institution, not globally.
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str, institution_id: i64) -> Result<Option<Member>> {
        let matches = self
            .repository
            .query(&|m: &Member| m.username == username && m.institution_id == institution_id)
            .await?;
        Ok(matches.into_iter().next())
    }

    #[instrument(skip(self, member), fields(username = %member.username))]
    pub async fn add(&self, member: Member) -> Result<Member> {
        validate(&member)?;
        let member = self.repository.add(member).await?;
        info!(member_id = member.id, "Member added");
        Ok(member)
    }

    #[instrument(skip(self, member), fields(member_id = member.id))]
    pub async fn update(&self, member: Member) -> Result<Member> {
        validate(&member)?;
        if self.repository.find_by_id(member.id).await?.is_none() {
            return Err(MemberError::NotFound(member.id));
        }
        Ok(self.repository.update(member).await?)
    }

    /// Resolve the member behind a sign-in.
    ///
    /// 1. A member with `username` in the institution wins. An anonymous one
    ///    signing in through online banking is upgraded in place.
    /// 2. Otherwise the supplied anonymous member is converted: it takes the
    ///    username, institution and auth type but keeps its id, so everything
    ///    keyed by that id stays attached.
    /// 3. Otherwise a new member is created.
    #[instrument(skip(self, anonymous))]
    pub async fn find_or_create(
        &self,
        username: &str,
        institution_id: i64,
        auth_type: AuthType,
        anonymous: Option<Member>,
    ) -> Result<Member> {
        if let Some(mut existing) = self.find_by_username(username, institution_id).await? {
            if existing.is_anonymous() && auth_type == AuthType::OnlineBanking {
                existing.auth_type = auth_type;
                if existing.profile.is_none() {
                    existing.profile = anonymous.and_then(|a| a.profile);
                }
                info!(member_id = existing.id, "Upgraded anonymous member to online banking");
                return Ok(self.repository.update(existing).await?);
            }
            debug!(member_id = existing.id, "Found existing member");
            return Ok(existing);
        }

        match anonymous {
            Some(mut member) => {
                member.username = username.to_string();
                member.institution_id = institution_id;
                member.auth_type = auth_type;
                validate(&member)?;

                let member = if member.id == 0 {
                    self.repository.add(member).await?
                } else {
                    self.repository.update(member).await?
                };
                info!(member_id = member.id, "Converted anonymous member");
                Ok(member)
            }
            None => self.add(Member::new(username, institution_id, auth_type)).await,
        }
    }
}

fn validate(member: &Member) -> Result<()> {
    if member.username.trim().is_empty() {
        return Err(MemberError::Validation("username must not be empty".to_string()));
    }
    Ok(())
}
