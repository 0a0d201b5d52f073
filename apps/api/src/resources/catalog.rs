//! Bundled catalog served when no live provider yields usable courses.

use crate::models::resources::{LearningCourse, Opportunity};

struct CatalogCourse {
    title: &'static str,
    provider: &'static str,
    link: &'static str,
    cost: &'static str,
    duration: &'static str,
    level: &'static str,
}

struct CatalogOpportunity {
    name: &'static str,
    description: &'static str,
    link: &'static str,
    difficulty: &'static str,
}

const COURSES: &[CatalogCourse] = &[
    CatalogCourse {
        title: "Google Data Analytics Professional Certificate",
        provider: "Coursera",
        link: "https://www.coursera.org/professional-certificates/google-data-analytics",
        cost: "Subscription",
        duration: "6 months",
        level: "Beginner",
    },
    CatalogCourse {
        title: "Machine Learning Specialization",
        provider: "Coursera",
        link: "https://www.coursera.org/specializations/machine-learning-introduction",
        cost: "Subscription",
        duration: "3 months",
        level: "Intermediate",
    },
    CatalogCourse {
        title: "AWS Cloud Practitioner Essentials",
        provider: "AWS Skill Builder",
        link: "https://explore.skillbuilder.aws/learn/course/external/view/elearning/134/aws-cloud-practitioner-essentials",
        cost: "Free",
        duration: "6 hours",
        level: "Beginner",
    },
    CatalogCourse {
        title: "CS50's Introduction to Computer Science",
        provider: "edX",
        link: "https://www.edx.org/learn/computer-science/harvard-university-cs50-s-introduction-to-computer-science",
        cost: "Free (certificate optional)",
        duration: "12 weeks",
        level: "Beginner",
    },
    CatalogCourse {
        title: "Responsive Web Design Certification",
        provider: "freeCodeCamp",
        link: "https://www.freecodecamp.org/learn/2022/responsive-web-design/",
        cost: "Free",
        duration: "300 hours",
        level: "Beginner",
    },
    CatalogCourse {
        title: "Intro to SQL",
        provider: "Kaggle Learn",
        link: "https://www.kaggle.com/learn/intro-to-sql",
        cost: "Free",
        duration: "3 hours",
        level: "Beginner",
    },
];

const OPPORTUNITIES: &[CatalogOpportunity] = &[
    CatalogOpportunity {
        name: "Kaggle Competitions",
        description: "Practice on real datasets and build a public portfolio.",
        link: "https://www.kaggle.com/competitions",
        difficulty: "Intermediate",
    },
    CatalogOpportunity {
        name: "Google Summer of Code",
        description: "Paid open-source contributions mentored by maintainers.",
        link: "https://summerofcode.withgoogle.com/",
        difficulty: "Intermediate",
    },
    CatalogOpportunity {
        name: "Good First Issues on GitHub",
        description: "Beginner-friendly issues across open-source projects.",
        link: "https://github.com/topics/good-first-issue",
        difficulty: "Beginner",
    },
    CatalogOpportunity {
        name: "Devpost Hackathons",
        description: "Online and in-person hackathons to ship projects quickly.",
        link: "https://devpost.com/hackathons",
        difficulty: "Beginner",
    },
];

pub fn static_courses() -> Vec<LearningCourse> {
    COURSES
        .iter()
        .map(|c| LearningCourse {
            title: c.title.to_string(),
            provider: c.provider.to_string(),
            link: c.link.to_string(),
            cost: Some(c.cost.to_string()),
            duration: Some(c.duration.to_string()),
            level: Some(c.level.to_string()),
        })
        .collect()
}

pub fn static_opportunities() -> Vec<Opportunity> {
    OPPORTUNITIES
        .iter()
        .map(|o| Opportunity {
            name: o.name.to_string(),
            description: Some(o.description.to_string()),
            link: o.link.to_string(),
            difficulty: Some(o.difficulty.to_string()),
        })
        .collect()
}
