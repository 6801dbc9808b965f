//! 资料相关表单与流程：首次完善、编辑、查看他人资料

use log::{error, warn};
use skillswap_shared::{
    NamedSkill, OfferedSkill, ProfileDraft, ProfileUpdate, UserProfileSummary, WantedSkill,
};

use crate::api::SkillSwapApi;
use crate::request::HttpClient;
use crate::route::AppRoute;
use crate::storage::KeyValueStore;

pub const PROFILE_SAVE_FAILED: &str = "Error saving profile";
pub const INVALID_AGE: &str = "Age must be a whole number";
pub const PROFILE_UPDATED: &str = "Profile updated successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillKind {
    Offered,
    Wanted,
}

// =========================================================
// 完善资料 (POST /api/profile)
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileForm {
    pub full_name: String,
    pub profile_picture: String,
    pub location: String,
    /// 原始输入，提交时解析
    pub age: String,
    pub skills_offered: Vec<OfferedSkill>,
    pub skills_wanted: Vec<WantedSkill>,
    pub bio: String,
    /// 逗号分隔
    pub known_languages: String,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            profile_picture: String::new(),
            location: String::new(),
            age: String::new(),
            skills_offered: vec![OfferedSkill::default()],
            skills_wanted: vec![WantedSkill::default()],
            bio: String::new(),
            known_languages: String::new(),
        }
    }
}

impl ProfileForm {
    pub fn add_skill(&mut self, kind: SkillKind) {
        match kind {
            SkillKind::Offered => self.skills_offered.push(OfferedSkill::default()),
            SkillKind::Wanted => self.skills_wanted.push(WantedSkill::default()),
        }
    }

    pub fn to_draft(&self) -> Result<ProfileDraft, String> {
        let age = self
            .age
            .trim()
            .parse::<u32>()
            .map_err(|_| INVALID_AGE.to_string())?;

        Ok(ProfileDraft {
            full_name: self.full_name.trim().to_string(),
            profile_picture: self.profile_picture.trim().to_string(),
            location: self.location.trim().to_string(),
            age,
            skills_offered: self.skills_offered.clone(),
            skills_wanted: self.skills_wanted.clone(),
            bio: self.bio.clone(),
            known_languages: split_languages(&self.known_languages),
            rating: 0.0,
        })
    }
}

fn split_languages(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect()
}

/// 提交首次资料，成功后前往主页
pub async fn complete_profile<C: HttpClient, S: KeyValueStore>(
    api: &SkillSwapApi<C, S>,
    form: &ProfileForm,
) -> Result<AppRoute, String> {
    let draft = form.to_draft()?;
    match api.create_profile(&draft).await {
        Ok(_) => Ok(AppRoute::Home),
        Err(err) => {
            error!("profile save failed: {}", err);
            Err(PROFILE_SAVE_FAILED.to_string())
        }
    }
}

// =========================================================
// 编辑资料 (PUT /api/profile)
// =========================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditProfileForm {
    pub full_name: String,
    pub bio: String,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
}

impl EditProfileForm {
    pub fn from_summary(profile: &UserProfileSummary) -> Self {
        Self {
            full_name: profile.display_name.clone(),
            bio: profile.bio.clone(),
            skills_offered: profile.skills_offered.clone(),
            skills_wanted: profile.skills_wanted.clone(),
        }
    }

    fn skills_mut(&mut self, kind: SkillKind) -> &mut Vec<String> {
        match kind {
            SkillKind::Offered => &mut self.skills_offered,
            SkillKind::Wanted => &mut self.skills_wanted,
        }
    }

    pub fn add_skill(&mut self, kind: SkillKind) {
        self.skills_mut(kind).push(String::new());
    }

    /// 越界索引被忽略
    pub fn remove_skill(&mut self, kind: SkillKind, index: usize) {
        let skills = self.skills_mut(kind);
        if index < skills.len() {
            skills.remove(index);
        }
    }

    pub fn set_skill(&mut self, kind: SkillKind, index: usize, name: String) {
        if let Some(slot) = self.skills_mut(kind).get_mut(index) {
            *slot = name;
        }
    }

    /// 空白技能名被丢弃
    pub fn to_update(&self) -> ProfileUpdate {
        let named = |skills: &[String]| {
            skills
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .map(|name| NamedSkill {
                    name: name.to_string(),
                })
                .collect()
        };
        ProfileUpdate {
            full_name: self.full_name.trim().to_string(),
            bio: self.bio.clone(),
            skills_offered: named(&self.skills_offered),
            skills_wanted: named(&self.skills_wanted),
        }
    }
}

/// 拉取当前资料用于预填；失败时返回空表单
pub async fn load_edit_form<C: HttpClient, S: KeyValueStore>(
    api: &SkillSwapApi<C, S>,
) -> EditProfileForm {
    match api.my_profile().await {
        Ok(profile) => EditProfileForm::from_summary(&profile),
        Err(err) => {
            error!("Error fetching profile: {}", err);
            EditProfileForm::default()
        }
    }
}

/// 成功时返回提示与下一步路由
pub async fn update_profile<C: HttpClient, S: KeyValueStore>(
    api: &SkillSwapApi<C, S>,
    form: &EditProfileForm,
) -> Result<(AppRoute, &'static str), String> {
    match api.update_profile(&form.to_update()).await {
        Ok(_) => Ok((AppRoute::Home, PROFILE_UPDATED)),
        Err(err) => {
            warn!("profile update failed: {}", err);
            Err(format!(
                "Failed to update profile: {}",
                err.message_or("Network Error")
            ))
        }
    }
}

// =========================================================
// 查看他人资料 (GET /api/profile/:id)
// =========================================================

pub async fn view_profile<C: HttpClient, S: KeyValueStore>(
    api: &SkillSwapApi<C, S>,
    id: &str,
) -> Result<UserProfileSummary, String> {
    api.profile(id)
        .await
        .map_err(|err| err.message_or(err.error_code()))
}
