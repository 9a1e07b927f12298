/// Amazon top-level domain for a marketplace code; unknown codes fall back to `de`.
pub fn amazon_tld(domain: &str) -> &'static str {
    match domain {
        "DE" => "de",
        "GB" => "co.uk",
        "US" => "com",
        _ => "de",
    }
}

pub fn amazon_seller_url(seller_id: &str, domain: &str) -> String {
    format!("https://www.amazon.{}/sp?seller={}", amazon_tld(domain), seller_id)
}

pub fn keepa_seller_url(seller_id: &str, domain: &str) -> String {
    format!("https://keepa.com/#!seller/{}/{}", domain, seller_id)
}
