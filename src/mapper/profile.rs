use crate::{
    core::utils::{date_to_string_opt, datetime_to_string_opt},
    model::{
        contact::Contact, education::Education, experience::Experience, skill::Skill,
        user_profile::ProfileAggregate,
    },
    schema::profile::{
        DetailContact, DetailEducation, DetailExperience, DetailSkill, ProfileResponse,
    },
};

/// External representation of a reloaded aggregate. A profile without a
/// contact row still exposes a contact object, with every field null.
pub fn to_profile_response(aggregate: &ProfileAggregate) -> ProfileResponse {
    ProfileResponse {
        id: aggregate.profile.id.to_string(),
        user_id: aggregate.profile.user_id.to_string(),
        resume_text: aggregate.profile.resume_text.clone(),
        created_date: datetime_to_string_opt(aggregate.profile.created_date),
        updated_date: datetime_to_string_opt(aggregate.profile.updated_date),
        contact: aggregate
            .contact
            .as_ref()
            .map(to_detail_contact)
            .unwrap_or(DetailContact {
                name: None,
                email: None,
                phone: None,
                linkedin: None,
            }),
        skills: aggregate.skills.iter().map(to_detail_skill).collect(),
        experience: aggregate
            .experience
            .iter()
            .map(to_detail_experience)
            .collect(),
        education: aggregate.education.iter().map(to_detail_education).collect(),
    }
}

fn to_detail_contact(contact: &Contact) -> DetailContact {
    DetailContact {
        name: contact.name.clone(),
        email: contact.email.clone(),
        phone: contact.phone.clone(),
        linkedin: contact.linkedin.clone(),
    }
}

fn to_detail_skill(skill: &Skill) -> DetailSkill {
    DetailSkill {
        id: skill.id.to_string(),
        name: skill.name.clone(),
    }
}

fn to_detail_experience(experience: &Experience) -> DetailExperience {
    DetailExperience {
        id: experience.id.to_string(),
        company: experience.company.clone(),
        role: experience.role.clone(),
        start_date: date_to_string_opt(experience.start_date),
        end_date: date_to_string_opt(experience.end_date),
        achievements: experience.achievements.clone(),
    }
}

fn to_detail_education(education: &Education) -> DetailEducation {
    DetailEducation {
        id: education.id.to_string(),
        degree: education.degree.clone(),
        institution: education.institution.clone(),
        year: education.year,
    }
}
