use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Root of the WHOIS delegation tree, asked when a TLD is not in the table.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

/// Well-known registry servers, keyed by lowercase TLD.
pub static WHOIS_SERVERS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("com", "whois.verisign-grs.com"),
        ("net", "whois.verisign-grs.com"),
        ("cc", "ccwhois.verisign-grs.com"),
        ("tv", "whois.nic.tv"),
        ("org", "whois.pir.org"),
        ("info", "whois.afilias.net"),
        ("biz", "whois.biz"),
        ("name", "whois.nic.name"),
        ("edu", "whois.educause.edu"),
        ("gov", "whois.dotgov.gov"),
        ("int", "whois.iana.org"),
        ("app", "whois.nic.google"),
        ("dev", "whois.nic.google"),
        ("page", "whois.nic.google"),
        ("io", "whois.nic.io"),
        ("co", "whois.nic.co"),
        ("me", "whois.nic.me"),
        ("ai", "whois.nic.ai"),
        ("xyz", "whois.nic.xyz"),
        ("online", "whois.nic.online"),
        ("site", "whois.nic.site"),
        ("tech", "whois.nic.tech"),
        ("shop", "whois.nic.shop"),
        ("cloud", "whois.nic.cloud"),
        ("us", "whois.nic.us"),
        ("uk", "whois.nic.uk"),
        ("de", "whois.denic.de"),
        ("fr", "whois.nic.fr"),
        ("nl", "whois.domain-registry.nl"),
        ("eu", "whois.eu"),
        ("ca", "whois.cira.ca"),
        ("au", "whois.auda.org.au"),
        ("jp", "whois.jprs.jp"),
    ])
});

static IANA_REFER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(?:refer|whois):[ \t]*(\S+)\s*$").expect("Invalid IANA refer regex")
});

static REGISTRAR_REFERRAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?im)^\s*Registrar WHOIS Server:[ \t]*(\S+)",
        r"(?im)^\s*Whois Server:[ \t]*(\S+)",
        r"(?im)^\s*ReferralServer:\s*whois://(\S+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid referral regex"))
    .collect()
});

pub fn get_whois_server(tld: &str) -> Option<&'static str> {
    WHOIS_SERVERS.get(tld.to_lowercase().as_str()).copied()
}

/// Server named by an IANA TLD record (`refer:` or `whois:` line).
pub fn extract_iana_referral(response: &str) -> Option<String> {
    IANA_REFER
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_lowercase())
        .filter(|server| server.contains('.'))
}

/// Registrar server a registry response points at, if any.
pub fn extract_referral(response: &str) -> Option<String> {
    REGISTRAR_REFERRAL_PATTERNS.iter().find_map(|re| {
        re.captures(response)
            .and_then(|caps| caps.get(1))
            .map(|m| normalize_server(m.as_str()))
            .filter(|server| !server.is_empty() && server.contains('.'))
    })
}

/// Strip scheme, path and port so only a hostname remains.
fn normalize_server(raw: &str) -> String {
    let server = raw.trim().to_lowercase();
    let server = server
        .strip_prefix("whois://")
        .or_else(|| server.strip_prefix("http://"))
        .or_else(|| server.strip_prefix("https://"))
        .unwrap_or(&server);
    let server = server.split('/').next().unwrap_or(server);
    server.split(':').next().unwrap_or(server).to_string()
}
