//! Static platform policy data and the projections prompts are built from.
//!
//! One hard invariant lives here: no policy line that touches identity
//! verification (government IDs, passports, proof of residence) may ever reach
//! a prompt. Requests for that kind of documentation re-traumatize the people
//! this tool exists to help, so the filter is unconditional and applied at the
//! projection boundary, not left to individual prompt builders.

use crate::case::{ContentContext, ContentType};

/// Keywords that mark a policy line as identity-verification related.
/// Matched as case-insensitive substrings, same as the wizard always has;
/// over-matching is acceptable, leaking is not.
const IDENTITY_KEYWORDS: &[&str] = &[
    "id",
    "identification",
    "passport",
    "license",
    "proof of residence",
    "government",
];

/// True if a policy line mentions identity verification and must be dropped.
pub fn mentions_identity_verification(line: &str) -> bool {
    let lower = line.to_lowercase();
    IDENTITY_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Drop every identity-verification line from a list of policy lines.
pub fn redact_identity_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| !mentions_identity_verification(line))
        .cloned()
        .collect()
}

/// A statute or regulation the platform's policy cites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalBasis {
    pub title: String,
    pub section: String,
    pub reference: String,
}

/// Which situations a content policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyScope {
    /// Non-consensual intimate imagery policies.
    Intimate,
    /// General privacy / personal information policies.
    Privacy,
    /// Fake accounts and impersonation policies.
    Impersonation,
    /// Applies to every takedown request on the platform.
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPolicy {
    pub policy: String,
    pub reference: String,
    pub scope: PolicyScope,
}

/// Expected platform turnaround times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeframes {
    pub response: String,
    pub removal: String,
}

/// The full policy record for one platform.
#[derive(Debug, Clone)]
pub struct PlatformPolicy {
    pub id: &'static str,
    pub name: &'static str,
    pub legal_basis: Vec<LegalBasis>,
    pub content_policies: Vec<ContentPolicy>,
    pub removal_criteria: Vec<String>,
    pub evidence_requirements: Vec<String>,
    pub timeframes: Timeframes,
}

/// The slice of a platform's policy record that applies to one case,
/// with identity-verification lines already removed.
#[derive(Debug, Clone)]
pub struct RelevantPolicies {
    pub platform_name: String,
    pub legal_basis: Vec<LegalBasis>,
    pub content_policies: Vec<ContentPolicy>,
    pub removal_criteria: Vec<String>,
    pub evidence_requirements: Vec<String>,
    pub timeframes: Timeframes,
}

impl PlatformPolicy {
    /// Narrow the full record to the policies applicable to this content
    /// type and context, redacting identity-verification lines on the way.
    pub fn relevant_policies(
        &self,
        content_type: ContentType,
        content_context: ContentContext,
    ) -> RelevantPolicies {
        let type_scope = match content_type {
            ContentType::Intimate => PolicyScope::Intimate,
            ContentType::Personal | ContentType::Private | ContentType::Other => {
                PolicyScope::Privacy
            }
        };
        let include_impersonation = content_context == ContentContext::Impersonation;

        let content_policies = self
            .content_policies
            .iter()
            .filter(|p| {
                p.scope == PolicyScope::General
                    || p.scope == type_scope
                    || (include_impersonation && p.scope == PolicyScope::Impersonation)
            })
            .filter(|p| !mentions_identity_verification(&p.policy))
            .cloned()
            .collect();

        RelevantPolicies {
            platform_name: self.name.to_string(),
            legal_basis: self.legal_basis.clone(),
            content_policies,
            removal_criteria: redact_identity_lines(&self.removal_criteria),
            evidence_requirements: redact_identity_lines(&self.evidence_requirements),
            timeframes: self.timeframes.clone(),
        }
    }
}

/// Look up the policy record for a platform id. Custom/unknown platforms have
/// no record and the pipeline proceeds without policy context.
pub fn get_platform_policy(platform_id: &str) -> Option<PlatformPolicy> {
    match platform_id {
        "facebook" => Some(facebook()),
        "instagram" => Some(instagram()),
        "tiktok" => Some(tiktok()),
        "onlyfans" => Some(onlyfans()),
        _ => None,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn facebook() -> PlatformPolicy {
    PlatformPolicy {
        id: "facebook",
        name: "Facebook",
        legal_basis: vec![
            LegalBasis {
                title: "Community Standards".to_string(),
                section: "Adult Nudity and Sexual Activity".to_string(),
                reference: "CS-14".to_string(),
            },
            LegalBasis {
                title: "Community Standards".to_string(),
                section: "Bullying and Harassment".to_string(),
                reference: "CS-8".to_string(),
            },
        ],
        content_policies: vec![
            ContentPolicy {
                policy: "Prohibits sharing intimate images without consent".to_string(),
                reference: "NCII-1".to_string(),
                scope: PolicyScope::Intimate,
            },
            ContentPolicy {
                policy: "Prohibits posting private information about others".to_string(),
                reference: "PRIV-2".to_string(),
                scope: PolicyScope::Privacy,
            },
            ContentPolicy {
                policy: "Prohibits accounts that impersonate another person".to_string(),
                reference: "IMP-1".to_string(),
                scope: PolicyScope::Impersonation,
            },
            ContentPolicy {
                policy: "Content that violates Community Standards is removed on review"
                    .to_string(),
                reference: "CS-1".to_string(),
                scope: PolicyScope::General,
            },
        ],
        removal_criteria: strings(&[
            "The image is intimate or sexualized and shared without consent",
            "The person shown can be recognized from the content or captions",
            "The content violates the named Community Standards section",
            "Government-issued ID may be requested to confirm identity",
        ]),
        evidence_requirements: strings(&[
            "Direct URLs to each piece of content being reported",
            "Description of where the content appears (profile, group, story)",
            "Proof of ownership such as original files or screenshots",
            "A copy of a government ID for identity verification",
        ]),
        timeframes: Timeframes {
            response: "within 48 hours".to_string(),
            removal: "typically within 7 days of confirmation".to_string(),
        },
    }
}

fn instagram() -> PlatformPolicy {
    PlatformPolicy {
        id: "instagram",
        name: "Instagram",
        legal_basis: vec![LegalBasis {
            title: "Community Guidelines".to_string(),
            section: "Intimate Image Abuse".to_string(),
            reference: "CG-11".to_string(),
        }],
        content_policies: vec![
            ContentPolicy {
                policy: "Prohibits non-consensual intimate imagery and threats to share it"
                    .to_string(),
                reference: "NCII-IG".to_string(),
                scope: PolicyScope::Intimate,
            },
            ContentPolicy {
                policy: "Prohibits sharing photos of private people without permission"
                    .to_string(),
                reference: "PRIV-IG".to_string(),
                scope: PolicyScope::Privacy,
            },
            ContentPolicy {
                policy: "Prohibits impersonation accounts".to_string(),
                reference: "IMP-IG".to_string(),
                scope: PolicyScope::Impersonation,
            },
        ],
        removal_criteria: strings(&[
            "The content depicts the reporter and was shared without consent",
            "The post, story, or reel violates the Intimate Image Abuse rules",
        ]),
        evidence_requirements: strings(&[
            "Links to the posts, stories, or accounts involved",
            "Approximate dates the content was posted",
            "Proof of residence or photo identification may be requested",
        ]),
        timeframes: Timeframes {
            response: "within 24 to 48 hours".to_string(),
            removal: "usually within a few days of review".to_string(),
        },
    }
}

fn tiktok() -> PlatformPolicy {
    PlatformPolicy {
        id: "tiktok",
        name: "TikTok",
        legal_basis: vec![LegalBasis {
            title: "Community Guidelines".to_string(),
            section: "Adult Sexual Abuse".to_string(),
            reference: "TT-CG-5".to_string(),
        }],
        content_policies: vec![
            ContentPolicy {
                policy: "Prohibits intimate imagery shared without the subject's consent"
                    .to_string(),
                reference: "TT-NCII".to_string(),
                scope: PolicyScope::Intimate,
            },
            ContentPolicy {
                policy: "Prohibits exposing personal information of others".to_string(),
                reference: "TT-PRIV".to_string(),
                scope: PolicyScope::Privacy,
            },
        ],
        removal_criteria: strings(&[
            "Intimate content shared without the subject's consent",
            "The account repeatedly posts content about the reporter",
        ]),
        evidence_requirements: strings(&[
            "Links to the content or the posting account",
            "Timeline of when the content appeared",
        ]),
        timeframes: Timeframes {
            response: "within 48 hours".to_string(),
            removal: "typically within 7 days".to_string(),
        },
    }
}

fn onlyfans() -> PlatformPolicy {
    PlatformPolicy {
        id: "onlyfans",
        name: "OnlyFans",
        legal_basis: vec![LegalBasis {
            title: "Terms of Service".to_string(),
            section: "Complaints about illegal or non-consensual content".to_string(),
            reference: "OF-ToS-12".to_string(),
        }],
        content_policies: vec![
            ContentPolicy {
                policy: "Prohibits content uploaded without the consent of everyone depicted"
                    .to_string(),
                reference: "OF-NCII".to_string(),
                scope: PolicyScope::Intimate,
            },
            ContentPolicy {
                policy: "Creators must hold documented consent for all co-performers".to_string(),
                reference: "OF-CONSENT".to_string(),
                scope: PolicyScope::General,
            },
        ],
        removal_criteria: strings(&[
            "The person shown never consented to the content being posted",
            "The complaint names the exact content and account",
        ]),
        evidence_requirements: strings(&[
            "URLs of the content and the account posting it",
            "A statement that the content was shared without consent",
            "Government ID verification through the complaints portal",
        ]),
        timeframes: Timeframes {
            response: "within 7 days".to_string(),
            removal: "content is suspended pending investigation".to_string(),
        },
    }
}
