//! Shop views
//!
//! Each view receives the resolved request and renders a complete HTML page.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::fmt::Write;

use super::catalog::{Catalog, Course};
use crate::http;
use crate::logger;
use crate::routing::{ParamValue, RouteTable};

/// Handler reference stored in the route table
pub type View = fn(&ViewRequest<'_>) -> Response<Full<Bytes>>;

/// Everything a view may read about the current request
pub struct ViewRequest<'a> {
    pub path: &'a str,
    pub is_head: bool,
    /// Converted placeholder values from the matched route
    pub args: &'a [(String, ParamValue)],
    pub catalog: &'a Catalog,
    /// For building links with `reverse`
    pub urls: &'a RouteTable<View>,
}

impl ViewRequest<'_> {
    pub fn arg(&self, name: &str) -> Option<&ParamValue> {
        self.args.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

/// Course listing
pub fn index(req: &ViewRequest<'_>) -> Response<Full<Bytes>> {
    let mut body = String::from("<h1>Courses</h1>\n");

    if req.catalog.all().is_empty() {
        body.push_str("<p>No courses available.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for course in req.catalog.all() {
            let id = course.id.to_string();
            match req
                .urls
                .reverse("shop:single_course", &[("course_id", id.as_str())])
            {
                Ok(href) => {
                    let _ = writeln!(
                        body,
                        "  <li><a href=\"{href}\">{}</a></li>",
                        escape_html(&course.title)
                    );
                }
                Err(e) => logger::log_error(&format!("Cannot link course {id}: {e}")),
            }
        }
        body.push_str("</ul>\n");
    }

    http::build_html_response(StatusCode::OK, render_page("Courses", &body), req.is_head)
}

/// Course detail, 404 when the id is not in the catalog
pub fn single_course(req: &ViewRequest<'_>) -> Response<Full<Bytes>> {
    let Some(course_id) = req.arg("course_id").and_then(ParamValue::as_int) else {
        logger::log_warning(&format!("single_course called without course_id: {}", req.path));
        return http::build_404_response(req.is_head);
    };

    let Some(course) = req.catalog.get(course_id) else {
        logger::log_debug(&format!("Course {course_id} not in catalog"));
        return http::build_404_response(req.is_head);
    };

    let back = req
        .urls
        .reverse("shop:index", &[])
        .unwrap_or_else(|_| "/".to_string());

    http::build_html_response(
        StatusCode::OK,
        render_page(&course.title, &render_course(course, &back)),
        req.is_head,
    )
}

fn render_course(course: &Course, back: &str) -> String {
    format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"{back}\">All courses</a></p>\n",
        escape_html(&course.title),
        escape_html(&course.description),
    )
}

fn render_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
