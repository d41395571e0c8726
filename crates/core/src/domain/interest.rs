use serde::Serialize;

use super::category::Category;
use super::{is_blank, level_in_range};
use crate::errors::DomainError;

/// A user's self-reported skill and interest in one category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserCategoryAffinity {
    user_id: String,
    category: Category,
    skill_level: u8,
    interest_level: u8,
}

impl UserCategoryAffinity {
    pub fn new(
        user_id: impl Into<String>,
        category: Category,
        skill_level: i32,
        interest_level: i32,
    ) -> Result<Self, DomainError> {
        let user_id = user_id.into();
        if is_blank(&user_id) {
            return Err(DomainError::BlankUserId);
        }
        let skill_level = checked_skill(skill_level)?;
        let interest_level = checked_interest(interest_level)?;

        Ok(Self { user_id, category, skill_level, interest_level })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn skill_level(&self) -> u8 {
        self.skill_level
    }

    pub fn interest_level(&self) -> u8 {
        self.interest_level
    }

    pub fn set_skill_level(&mut self, level: i32) -> Result<(), DomainError> {
        self.skill_level = checked_skill(level)?;
        Ok(())
    }

    pub fn set_interest_level(&mut self, level: i32) -> Result<(), DomainError> {
        self.interest_level = checked_interest(level)?;
        Ok(())
    }
}

fn checked_skill(level: i32) -> Result<u8, DomainError> {
    if level_in_range(level) {
        Ok(level as u8)
    } else {
        Err(DomainError::SkillLevelOutOfRange { value: level })
    }
}

fn checked_interest(level: i32) -> Result<u8, DomainError> {
    if level_in_range(level) {
        Ok(level as u8)
    } else {
        Err(DomainError::InterestLevelOutOfRange { value: level })
    }
}
