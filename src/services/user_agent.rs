//! User-Agent parsing for traces (woothee)

use woothee::parser::Parser;

/// 解析后的 UA 摘要
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUserAgent {
    pub browser: Option<String>,
    pub os: Option<String>,
    /// woothee category: pc / smartphone / mobilephone / appliance / crawler / misc
    pub device: Option<String>,
    pub is_bot: bool,
}

fn known(value: &str) -> Option<String> {
    (!value.is_empty() && value != "UNKNOWN").then(|| value.to_string())
}

pub fn parse_user_agent(ua_string: &str) -> ParsedUserAgent {
    let Some(result) = Parser::new().parse(ua_string) else {
        return ParsedUserAgent::default();
    };

    ParsedUserAgent {
        browser: known(result.name),
        os: known(result.os),
        device: known(result.category),
        is_bot: result.category == "crawler",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_agent_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        let parsed = parse_user_agent(ua);

        assert_eq!(parsed.browser.as_deref(), Some("Chrome"));
        assert_eq!(parsed.os.as_deref(), Some("Windows 10"));
        assert_eq!(parsed.device.as_deref(), Some("pc"));
        assert!(!parsed.is_bot);
    }

    #[test]
    fn test_parse_user_agent_iphone() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
        let parsed = parse_user_agent(ua);

        assert_eq!(parsed.browser.as_deref(), Some("Safari"));
        assert_eq!(parsed.device.as_deref(), Some("smartphone"));
    }

    #[test]
    fn test_parse_user_agent_googlebot() {
        let parsed = parse_user_agent(
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
        );
        assert_eq!(parsed.device.as_deref(), Some("crawler"));
        assert!(parsed.is_bot);
    }

    #[test]
    fn test_parse_garbage() {
        let parsed = parse_user_agent("");
        assert!(!parsed.is_bot);
        assert!(parsed.browser.is_none());
    }
}
