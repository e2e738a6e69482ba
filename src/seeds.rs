//! Default records written the first time a collection is accessed.

use chrono::NaiveDate;

use crate::models::{
    Contact, Department, Priority, Role, Task, TaskStatus, TaskSubmission, Team, User, NONE_MARKER,
};

fn department(id: u64, name: &str, parent: &str) -> Department {
    let main_branch = if parent == NONE_MARKER { name } else { parent };
    Department {
        id,
        name: name.into(),
        description: String::new(),
        parent: parent.into(),
        main_branch: main_branch.into(),
    }
}

pub fn departments() -> Vec<Department> {
    vec![
        department(1, "Designing", NONE_MARKER),
        department(2, "backend", "Development"),
        department(3, "Frontend", "Development"),
        department(4, "Development", NONE_MARKER),
    ]
}

pub fn roles() -> Vec<Role> {
    ["employ", "Team Lead", "manager", "Admin"]
        .iter()
        .zip(1..)
        .map(|(name, id)| Role {
            id,
            name: (*name).into(),
            description: NONE_MARKER.into(),
            ..Role::default()
        })
        .collect()
}

pub fn users() -> Vec<User> {
    vec![
        User {
            id: 1,
            username: "admin".into(),
            role: NONE_MARKER.into(),
            department: NONE_MARKER.into(),
            linked_contact: String::new(),
            staff_status: true,
        },
        User {
            id: 2,
            username: "syedaalin".into(),
            role: "Admin".into(),
            department: "Development".into(),
            linked_contact: String::new(),
            staff_status: true,
        },
    ]
}

pub fn teams() -> Vec<Team> {
    Vec::new()
}

pub fn tasks() -> Vec<Task> {
    vec![Task {
        id: 1,
        title: "jira test".into(),
        description: String::new(),
        priority: Priority::Medium,
        status: TaskStatus::Completed,
        deadline: NaiveDate::from_ymd_opt(2026, 1, 20),
        assigned_to: "Ahmed Ali (Admin)".into(),
        team: String::new(),
        assigned_by: "Admin (admin)".into(),
        created_at: String::new(),
        updated_at: String::new(),
    }]
}

pub fn submissions() -> Vec<TaskSubmission> {
    vec![TaskSubmission {
        id: 1,
        task: "jira test".into(),
        submission_note: NONE_MARKER.into(),
        submission_file: None,
        submitted_by: "syedaalin (Admin)".into(),
        created_at: "2026-01-17T10:47:00".into(),
    }]
}

#[allow(clippy::too_many_arguments)]
fn contact(id: u64, title: &str, first: &str, last: &str, email: &str, phone: &str, city: &str, country: &str, designation: &str) -> Contact {
    Contact {
        id,
        title: title.into(),
        first_name: first.into(),
        last_name: last.into(),
        email: email.into(),
        phone: phone.into(),
        city: city.into(),
        country: country.into(),
        designation: designation.into(),
        ..Contact::default()
    }
}

pub fn contacts() -> Vec<Contact> {
    vec![
        contact(1, "Mr.", "Ali", "Khan", "ali.khan@example.com", "+92 300 1234567", "Lahore", "Pakistan", "Senior Developer"),
        contact(2, "Ms.", "Sara", "Ahmed", "sara.ahmed@example.com", "+92 321 7654321", "Karachi", "Pakistan", "Product Manager"),
        contact(3, "Mr.", "John", "Doe", "john.doe@example.com", "+1 555 0123", "New York", "USA", "Director"),
        contact(4, "Ms.", "Fatima", "Zahra", "fatima.z@example.com", "+92 333 9876543", "Islamabad", "Pakistan", "UX Designer"),
    ]
}
