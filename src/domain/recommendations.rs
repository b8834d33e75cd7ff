//! Static guidance shown for each risk tier.

use serde::Serialize;

use super::scoring::RiskLevel;

/// A themed group of tips.
#[derive(Debug, Serialize)]
pub struct GuidanceCategory {
    pub category: &'static str,
    pub tips: &'static [&'static str],
}

/// Guidance for one tier.
#[derive(Debug, Serialize)]
pub struct TierGuidance {
    pub tier: RiskLevel,
    pub title: &'static str,
    pub description: &'static str,
    pub categories: &'static [GuidanceCategory],
}

static LOW: TierGuidance = TierGuidance {
    tier: RiskLevel::Low,
    title: "Low Risk - Excellent!",
    description: "You are in good mental health. Maintain your current wellness habits.",
    categories: &[
        GuidanceCategory {
            category: "Physical Activity",
            tips: &[
                "Continue regular exercise (30 mins daily)",
                "Explore new physical activities you enjoy",
                "Consider outdoor activities for vitamin D exposure",
            ],
        },
        GuidanceCategory {
            category: "Sleep & Rest",
            tips: &[
                "Maintain consistent sleep schedule (7-8 hours)",
                "Create a relaxing bedtime routine",
                "Avoid screens 1 hour before bed",
            ],
        },
        GuidanceCategory {
            category: "Mental Wellness",
            tips: &[
                "Practice mindfulness or meditation (10 mins daily)",
                "Maintain social connections",
                "Engage in hobbies and creative activities",
            ],
        },
        GuidanceCategory {
            category: "Lifestyle",
            tips: &[
                "Eat balanced, nutritious meals",
                "Limit caffeine and sugar intake",
                "Spend time in nature regularly",
            ],
        },
    ],
};

static MODERATE: TierGuidance = TierGuidance {
    tier: RiskLevel::Moderate,
    title: "Moderate Risk - Take Action",
    description: "You are experiencing moderate stress/depression. Consider lifestyle changes and support.",
    categories: &[
        GuidanceCategory {
            category: "Physical Activity",
            tips: &[
                "Increase exercise to 45-60 minutes daily",
                "Try activities like yoga, walking, or swimming",
                "Join fitness classes or sports groups for social support",
            ],
        },
        GuidanceCategory {
            category: "Sleep & Rest",
            tips: &[
                "Prioritize 7-9 hours of sleep nightly",
                "Develop relaxation techniques (breathing, progressive muscle relaxation)",
                "Keep bedroom cool, dark, and quiet",
            ],
        },
        GuidanceCategory {
            category: "Social Support",
            tips: &[
                "Spend quality time with family and friends",
                "Join community groups or clubs",
                "Consider peer support groups",
                "Reach out to trusted people about your feelings",
            ],
        },
        GuidanceCategory {
            category: "Stress Management",
            tips: &[
                "Practice daily meditation (15-20 mins)",
                "Try journaling to process emotions",
                "Use stress-relief apps (Calm, Headspace, Insight Timer)",
                "Identify and reduce stressors where possible",
            ],
        },
        GuidanceCategory {
            category: "Professional Help",
            tips: &[
                "Consider speaking with a counselor or therapist",
                "Consult your doctor about mental health screening",
                "Explore cognitive behavioral therapy (CBT) resources",
            ],
        },
    ],
};

static HIGH: TierGuidance = TierGuidance {
    tier: RiskLevel::High,
    title: "High Risk - Seek Professional Help",
    description: "You are experiencing significant stress/depression. Professional support is strongly recommended.",
    categories: &[
        GuidanceCategory {
            category: "Immediate Actions",
            tips: &[
                "URGENT: Contact a mental health professional or counselor immediately",
                "Call your doctor and schedule an appointment",
                "Consider visiting a mental health clinic or hospital",
                "If in crisis, call emergency services or crisis helpline",
            ],
        },
        GuidanceCategory {
            category: "Professional Treatment",
            tips: &[
                "Consult a psychiatrist for comprehensive evaluation",
                "Consider therapy (CBT, DBT, or psychotherapy)",
                "Discuss medication options with doctor if appropriate",
                "Explore inpatient or outpatient treatment programs",
            ],
        },
        GuidanceCategory {
            category: "Crisis Support",
            tips: &[
                "National Suicide Prevention Lifeline: 1-800-273-8255 (US)",
                "Crisis Text Line: Text HOME to 741741",
                "International Association for Suicide Prevention: https://www.iasp.info/resources/Crisis_Centres/",
                "AAMI (Befrienders India): 9152987821 (India)",
            ],
        },
        GuidanceCategory {
            category: "Daily Wellness (Supplementary)",
            tips: &[
                "Engage in light physical activity (short walks)",
                "Maintain regular sleep schedule",
                "Eat nutritious meals at regular times",
                "Avoid alcohol and drugs",
                "Connect with supportive people",
            ],
        },
        GuidanceCategory {
            category: "Self-Care",
            tips: &[
                "Create a safety plan with professional guidance",
                "Keep emergency contact numbers accessible",
                "Maintain daily routine and structure",
                "Track mood and symptoms in a journal",
            ],
        },
    ],
};

/// Guidance entry for `tier`.
#[must_use]
pub fn recommendations_for(tier: RiskLevel) -> &'static TierGuidance {
    match tier {
        RiskLevel::Low => &LOW,
        RiskLevel::Moderate => &MODERATE,
        RiskLevel::High => &HIGH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tier_has_guidance() {
        for tier in RiskLevel::ALL {
            let guidance = recommendations_for(tier);
            assert_eq!(guidance.tier, tier);
            assert!(!guidance.categories.is_empty());
            assert!(guidance.categories.iter().all(|c| !c.tips.is_empty()));
        }
    }

    #[test]
    fn test_high_tier_lists_crisis_support() {
        let guidance = recommendations_for(RiskLevel::High);
        assert!(guidance.categories.iter().any(|c| c.category == "Crisis Support"));
    }
}
