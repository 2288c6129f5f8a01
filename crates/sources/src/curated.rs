use crate::OpportunitySource;
use async_trait::async_trait;
use chrono::NaiveDate;
use domain::{Category, Deadline, Opportunity, OpportunityType};

/// Hand-maintained catalog of real programs. No network call, so this is
/// the fallback source that keeps the aggregate non-empty even when every
/// live provider is down.
#[derive(Debug, Clone, Default)]
pub struct CuratedSource;

impl CuratedSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OpportunitySource for CuratedSource {
    fn name(&self) -> &str {
        "Custom"
    }

    async fn fetch(&self, _query: Option<&str>) -> Vec<Opportunity> {
        catalog()
    }
}

fn date(year: i32, month: u32, day: u32) -> Deadline {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(Deadline::Date)
        .unwrap_or(Deadline::Ongoing)
}

struct Entry {
    id: &'static str,
    title: &'static str,
    organization: &'static str,
    kind: OpportunityType,
    deadline: Deadline,
    eligibility: &'static str,
    link: &'static str,
    description: &'static str,
    category: Category,
    location: &'static str,
    tags: [&'static str; 3],
    logo: &'static str,
}

impl From<Entry> for Opportunity {
    fn from(e: Entry) -> Self {
        Opportunity {
            id: e.id.to_string(),
            title: e.title.to_string(),
            organization: e.organization.to_string(),
            kind: e.kind,
            deadline: e.deadline,
            eligibility: e.eligibility.to_string(),
            link: e.link.to_string(),
            description: e.description.to_string(),
            category: e.category,
            source: "Custom".to_string(),
            location: Some(e.location.to_string()),
            tags: e.tags.iter().map(|t| t.to_string()).collect(),
            logo: Some(e.logo.to_string()),
            trending: true,
        }
    }
}

/// The full curated list, two to four entries per category.
pub fn catalog() -> Vec<Opportunity> {
    let entries = [
        // Technology
        Entry {
            id: "gsoc-2025",
            title: "Google Summer of Code 2025",
            organization: "Google",
            kind: OpportunityType::Internship,
            deadline: date(2025, 4, 2),
            eligibility: "University students 18 years or older",
            link: "https://summerofcode.withgoogle.com/",
            description: "Global program bringing more student developers into open source software development. Stipend ranges from $1500-$3300.",
            category: Category::Technology,
            location: "Remote",
            tags: ["Open Source", "Programming", "Student Program"],
            logo: "https://summerofcode.withgoogle.com/static/favicon.ico",
        },
        Entry {
            id: "mlh-fellowship-2025",
            title: "MLH Fellowship Summer 2025",
            organization: "Major League Hacking",
            kind: OpportunityType::Fellowship,
            deadline: date(2025, 3, 31),
            eligibility: "Students and recent graduates",
            link: "https://fellowship.mlh.io/",
            description: "Get paid to contribute to real open source projects and build your portfolio. $5000 stipend for 12 weeks.",
            category: Category::Technology,
            location: "Remote",
            tags: ["Software Engineering", "Open Source", "Internship"],
            logo: "https://fellowship.mlh.io/favicon.ico",
        },
        Entry {
            id: "microsoft-internship-2025",
            title: "Microsoft Summer Internship 2025",
            organization: "Microsoft",
            kind: OpportunityType::Internship,
            deadline: date(2025, 3, 15),
            eligibility: "Current students in Computer Science or related fields",
            link: "https://careers.microsoft.com/students/",
            description: "Work on real projects that matter and shape the future of technology. Competitive compensation and housing assistance provided.",
            category: Category::Technology,
            location: "Various Locations",
            tags: ["Software Development", "Cloud Computing", "AI"],
            logo: "https://careers.microsoft.com/favicon.ico",
        },
        Entry {
            id: "amazon-sde-intern-2024",
            title: "Amazon SDE Internship Summer 2024",
            organization: "Amazon",
            kind: OpportunityType::Internship,
            deadline: date(2024, 3, 30),
            eligibility: "Currently enrolled students in Computer Science",
            link: "https://www.amazon.jobs/student-programs",
            description: "Summer internships for talented developers. Competitive pay and relocation assistance included.",
            category: Category::Technology,
            location: "Multiple Locations",
            tags: ["Software Engineering", "AWS", "E-commerce"],
            logo: "https://www.amazon.jobs/favicon.ico",
        },
        // Education
        Entry {
            id: "teach-for-america-2024",
            title: "Teach For America Corps 2024",
            organization: "Teach For America",
            kind: OpportunityType::Fellowship,
            deadline: date(2024, 3, 15),
            eligibility: "Bachelor's degree holders",
            link: "https://www.teachforamerica.org/how-to-join",
            description: "Work towards educational equity. Full salary, benefits, and training provided.",
            category: Category::Education,
            location: "United States",
            tags: ["Teaching", "Education", "Social Impact"],
            logo: "https://www.teachforamerica.org/favicon.ico",
        },
        Entry {
            id: "fulbright-2024",
            title: "Fulbright Teaching Excellence Program 2024",
            organization: "Fulbright",
            kind: OpportunityType::Fellowship,
            deadline: date(2024, 4, 15),
            eligibility: "US citizens with teaching experience",
            link: "https://fulbrightteacher.org/",
            description: "Teach abroad and promote international understanding through education. Fully funded opportunity.",
            category: Category::Education,
            location: "International",
            tags: ["International Education", "Cultural Exchange", "Teaching"],
            logo: "https://fulbrightteacher.org/favicon.ico",
        },
        // Healthcare
        Entry {
            id: "who-internship-2024",
            title: "WHO Summer Internship 2024",
            organization: "World Health Organization",
            kind: OpportunityType::Internship,
            deadline: date(2024, 3, 31),
            eligibility: "Graduate students in health-related fields",
            link: "https://www.who.int/careers/internships",
            description: "Hands-on experience in global health initiatives. Positions available in various WHO offices worldwide.",
            category: Category::Healthcare,
            location: "Various Locations",
            tags: ["Healthcare", "Public Health", "International"],
            logo: "https://www.who.int/favicon.ico",
        },
        Entry {
            id: "nih-summer-2024",
            title: "NIH Summer Research Program 2024",
            organization: "National Institutes of Health",
            kind: OpportunityType::Research,
            deadline: date(2024, 3, 1),
            eligibility: "Students in biomedical/health fields",
            link: "https://www.training.nih.gov/programs/sip",
            description: "Conduct biomedical research with leading scientists. Stipend provided.",
            category: Category::Healthcare,
            location: "Bethesda, MD",
            tags: ["Research", "Biomedical", "Healthcare"],
            logo: "https://www.nih.gov/favicon.ico",
        },
        // Social
        Entry {
            id: "un-volunteers-2024",
            title: "UN Online Volunteering 2024",
            organization: "United Nations",
            kind: OpportunityType::Volunteer,
            deadline: Deadline::RollingApplications,
            eligibility: "Anyone 18+",
            link: "https://www.onlinevolunteering.org/en",
            description: "Support sustainable development and humanitarian projects worldwide, from anywhere.",
            category: Category::Social,
            location: "Remote",
            tags: ["Social Impact", "Volunteering", "Global Development"],
            logo: "https://www.un.org/favicon.ico",
        },
        Entry {
            id: "amnesty-2024",
            title: "Amnesty International Youth Program 2024",
            organization: "Amnesty International",
            kind: OpportunityType::Program,
            deadline: date(2024, 3, 30),
            eligibility: "Youth activists 18-25",
            link: "https://www.amnesty.org/en/youth/",
            description: "Youth program focusing on advocacy, campaigns, and human rights education.",
            category: Category::Social,
            location: "Global",
            tags: ["Human Rights", "Advocacy", "Youth"],
            logo: "https://www.amnesty.org/favicon.ico",
        },
        // Environment
        Entry {
            id: "greenpeace-2024",
            title: "Climate Action Fellowship 2024",
            organization: "Greenpeace",
            kind: OpportunityType::Fellowship,
            deadline: date(2024, 3, 1),
            eligibility: "Environmental activists and researchers",
            link: "https://www.greenpeace.org/international/act/",
            description: "Work on environmental campaigns focused on climate change mitigation and adaptation strategies.",
            category: Category::Environment,
            location: "Various Locations",
            tags: ["Environment", "Climate Action", "Activism"],
            logo: "https://www.greenpeace.org/favicon.ico",
        },
        Entry {
            id: "wwf-2024",
            title: "WWF Conservation Fellowship 2024",
            organization: "World Wildlife Fund",
            kind: OpportunityType::Fellowship,
            deadline: date(2024, 4, 15),
            eligibility: "Conservation and environmental professionals",
            link: "https://www.worldwildlife.org/about/careers",
            description: "Critical conservation projects worldwide, focused on biodiversity and ecosystem preservation.",
            category: Category::Environment,
            location: "Multiple Locations",
            tags: ["Conservation", "Wildlife", "Research"],
            logo: "https://www.worldwildlife.org/favicon.ico",
        },
        // Global
        Entry {
            id: "un-youth-2024",
            title: "UN Youth Delegate Programme 2024",
            organization: "United Nations",
            kind: OpportunityType::Program,
            deadline: date(2024, 3, 15),
            eligibility: "Youth aged 18-24",
            link: "https://www.un.org/youthenvoy/",
            description: "Represent youth voices at the United Nations. Full funding provided for selected delegates.",
            category: Category::Global,
            location: "Global",
            tags: ["Youth Leadership", "International Relations", "Policy"],
            logo: "https://www.un.org/favicon.ico",
        },
        Entry {
            id: "aiesec-2024",
            title: "AIESEC Global Talent Program 2024",
            organization: "AIESEC",
            kind: OpportunityType::Internship,
            deadline: date(2024, 3, 31),
            eligibility: "Students and recent graduates",
            link: "https://aiesec.org/global-talent",
            description: "Develop leadership potential through international internships worldwide.",
            category: Category::Global,
            location: "Worldwide",
            tags: ["Leadership", "International", "Professional Development"],
            logo: "https://aiesec.org/favicon.ico",
        },
    ];

    entries.into_iter().map(Opportunity::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn catalog_is_never_empty_and_needs_no_network() {
        let opportunities = CuratedSource::new().fetch(None).await;
        assert!(!opportunities.is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let ids: Vec<_> = catalog().into_iter().map(|o| o.id).collect();
        let unique: HashSet<_> = ids.iter().cloned().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn every_category_is_represented() {
        let present: HashSet<_> = catalog().into_iter().map(|o| o.category).collect();
        for category in Category::ALL {
            assert!(present.contains(&category), "missing {category}");
        }
    }

    #[test]
    fn all_entries_are_trending_custom_listings() {
        for opp in catalog() {
            assert!(opp.trending);
            assert_eq!(opp.source, "Custom");
        }
    }
}
