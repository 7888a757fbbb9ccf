//! Server-rendered pages for the public, unauthenticated side of the directory.

use crate::models::employee::EmployeeRecord;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
        body {{ font-family: sans-serif; max-width: 32rem; margin: 2rem auto; padding: 0 1rem; }}
        dt {{ font-weight: bold; margin-top: .5rem; }}
        .blood-group {{ font-size: 2rem; color: #b00020; }}
        img.qr {{ width: 12rem; height: 12rem; }}
    </style>
</head>
<body>
{body}
</body>
</html>"#,
        title = html_escape(title),
        body = body,
    )
}

/// Emergency details page. `qr_src` is an `<img>` source for the employee's code.
pub fn employee_page(employee: &EmployeeRecord, qr_src: &str) -> String {
    let details = &employee.emergency;
    let body = format!(
        r#"    <h1>{name}</h1>
    <p>Employee ID: <span class="employee-id">{id}</span></p>
    <dl>
        <dt>Date of Birth</dt><dd>{dob}</dd>
        <dt>Gender</dt><dd>{gender}</dd>
    </dl>
    <h2>Emergency Details</h2>
    <dl>
        <dt>Blood group</dt><dd class="blood-group">{blood_group}</dd>
        <dt>Contact Person Name</dt><dd>{contact}</dd>
        <dt>Relation</dt><dd>{relation}</dd>
        <dt>Phone Number</dt><dd><a href="tel:{phone}">{phone}</a></dd>
        <dt>Company Phone Number</dt><dd><a href="tel:{company_phone}">{company_phone}</a></dd>
    </dl>
    <img class="qr" src="{qr_src}" alt="QR code for {id}">"#,
        name = html_escape(&employee.name),
        id = html_escape(&employee.id),
        dob = employee.date_of_birth.format("%Y-%m-%d"),
        gender = html_escape(&employee.gender),
        blood_group = html_escape(&details.blood_group),
        contact = html_escape(&details.contact_person_name),
        relation = html_escape(&details.relation),
        phone = html_escape(&details.phone_number),
        company_phone = html_escape(&details.company_phone_number),
        qr_src = html_escape(qr_src),
    );
    page(&format!("Emergency details: {}", employee.name), &body)
}

pub fn not_found_page(message: &str) -> String {
    let body = format!(
        "    <h1>Not found</h1>\n    <p>{}</p>",
        html_escape(message)
    );
    page("Not found", &body)
}
