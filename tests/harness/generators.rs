// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for pages and URIs.

/// Generate a pool of source URIs on distinct hosts.
pub fn generate_sources(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://source-{}.example.com/post/{}", i / 10, i % 10))
        .collect()
}

/// Generate a pool of target URIs on one host.
pub fn generate_targets(count: usize, domain: &str) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://{}/article/{}", domain, i))
        .collect()
}

/// A blog post titled `title` whose body links to every URI in `links`.
pub fn article(title: &str, links: &[&str]) -> String {
    let paragraphs: String = links
        .iter()
        .map(|link| {
            format!(
                "<p>I really enjoyed <a href=\"{link}\">this piece</a> and \
                 wanted to share some thoughts about it with everyone.</p>\n"
            )
        })
        .collect();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n\t<title>{title}</title>\n</head>\n<body>\n\
         <h1>{title}</h1>\n{paragraphs}</body>\n</html>\n"
    )
}

/// A page of `paragraphs` filler paragraphs around a single link to `link`.
pub fn long_article(title: &str, link: &str, paragraphs: usize) -> String {
    let filler = "<p>Lorem ipsum dolor sit amet, consectetur adipiscing elit,\n\
                  sed do eiusmod tempor incididunt ut labore.</p>\n"
        .repeat(paragraphs);
    format!(
        "<html><head><title>{title}</title></head><body>{filler}\
         <p>Hello <a href=\"{link}\">world</a> nice to see you here today friend</p>\n\
         {filler}</body></html>"
    )
}

/// Inbound request bodies that must not decode.
pub fn generate_malformed_requests() -> Vec<(&'static str, pingback::FaultCode)> {
    use pingback::FaultCode;
    vec![
        ("", FaultCode::ParseError),
        ("<html>not xml-rpc</html>", FaultCode::ParseError),
        (
            "<methodCall><params><param><value><string>a</string></value></param></params></methodCall>",
            FaultCode::ParseError,
        ),
        (
            "<methodCall><methodName>pingback.ping</methodName><params></params></methodCall>",
            FaultCode::ParseError,
        ),
        (
            "<methodCall><methodName>pingback.extensions.getPingbacks</methodName>\
             <params><param><value><string>http://t/</string></value></param></params></methodCall>",
            FaultCode::WrongMethod,
        ),
        (
            "<methodCall><methodName>pingback.ping</methodName>\
             <params><param><value><string>http://s/</string></value></param></params></methodCall>",
            FaultCode::WrongParams,
        ),
        (
            "<methodCall><methodName>pingback.ping</methodName><params>\
             <param><value><string>http://s/</string></value></param>\
             <param><value><int>7</int></value></param></params></methodCall>",
            FaultCode::WrongParams,
        ),
    ]
}
