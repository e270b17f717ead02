//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! A deliberately shallow scanner.
//!
//! The dependency analysis only needs to see identifiers and a handful of
//! delimiters, with comments, string literals, and character literals out of
//! the way. Everything else (operators, numbers, bit strings) is dropped on
//! the floor. Comment text is kept aside so pragmas can be scanned from it.

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Word(String),
    Delim(char),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    token: Token,
    line: usize,
}

impl Lexeme {
    pub fn get_line(&self) -> usize {
        self.line
    }

    /// Views the token as an identifier-like word.
    pub fn as_word(&self) -> Option<&str> {
        match &self.token {
            Token::Word(w) => Some(w.as_ref()),
            Token::Delim(_) => None,
        }
    }

    /// Checks the word against a VHDL keyword, ignoring case.
    pub fn check_keyword(&self, kw: &str) -> bool {
        match self.as_word() {
            Some(w) => crate::util::strcmp::cmp_ignore_case(w, kw),
            None => false,
        }
    }

    pub fn is_delim(&self, d: char) -> bool {
        self.token == Token::Delim(d)
    }
}

#[derive(Debug, PartialEq)]
pub struct Scan {
    tokens: Vec<Lexeme>,
    comments: Vec<(usize, String)>,
    anomalies: Vec<(usize, String)>,
}

impl Scan {
    pub fn get_tokens(&self) -> &Vec<Lexeme> {
        &self.tokens
    }

    pub fn get_comments(&self) -> &Vec<(usize, String)> {
        &self.comments
    }

    pub fn get_anomalies(&self) -> &Vec<(usize, String)> {
        &self.anomalies
    }
}

/// Which delimiters survive into the token stream.
fn is_delim(c: char) -> bool {
    match c {
        ':' | ';' | ',' | '.' | '(' | ')' => true,
        _ => false,
    }
}

/// Scans `source` into the reduced token stream.
pub fn scan(source: &str) -> Scan {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut comments = Vec::new();
    let mut anomalies = Vec::new();
    let mut line: usize = 1;
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            line += 1;
            i += 1;
        } else if c == '-' && chars.get(i + 1) == Some(&'-') {
            // single-line comment; keep the text for pragma scanning
            i += 2;
            let start = i;
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            comments.push((line, chars[start..i].iter().collect()));
        } else if c == '"' {
            // elide the string literal; doubled quotes are escapes
            i += 1;
            loop {
                match chars.get(i) {
                    Some('"') => {
                        i += 1;
                        if chars.get(i) == Some(&'"') {
                            i += 1;
                        } else {
                            break;
                        }
                    }
                    Some('\n') | None => {
                        anomalies.push((line, String::from("unterminated string literal")));
                        break;
                    }
                    Some(_) => i += 1,
                }
            }
        } else if c == '\'' {
            // a character literal is exactly three characters; anything else
            // is an attribute or qualified-expression tick
            if chars.get(i + 2) == Some(&'\'') && chars.get(i + 1) != Some(&'\n') {
                i += 3;
            } else {
                i += 1;
            }
        } else if c == '\\' {
            // extended identifier
            let start = i;
            i += 1;
            loop {
                match chars.get(i) {
                    Some('\\') => {
                        i += 1;
                        if chars.get(i) == Some(&'\\') {
                            i += 1;
                        } else {
                            break;
                        }
                    }
                    Some('\n') | None => {
                        anomalies.push((line, String::from("unterminated extended identifier")));
                        break;
                    }
                    Some(_) => i += 1,
                }
            }
            tokens.push(Lexeme {
                token: Token::Word(chars[start..i].iter().collect()),
                line: line,
            });
        } else if c.is_alphabetic() == true {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() == true || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Lexeme {
                token: Token::Word(chars[start..i].iter().collect()),
                line: line,
            });
        } else if c.is_ascii_digit() == true {
            // swallow abstract and based literals so their inner dots and
            // letters do not masquerade as delimiters or words
            while i < chars.len()
                && (chars[i].is_alphanumeric() == true || chars[i] == '_' || chars[i] == '#')
            {
                i += 1;
            }
            if chars.get(i) == Some(&'.')
                && chars.get(i + 1).map(|c| c.is_ascii_digit()) == Some(true)
            {
                i += 1;
                while i < chars.len() && (chars[i].is_alphanumeric() == true || chars[i] == '_') {
                    i += 1;
                }
            }
        } else if is_delim(c) == true {
            tokens.push(Lexeme {
                token: Token::Delim(c),
                line: line,
            });
            i += 1;
        } else {
            i += 1;
        }
    }

    Scan {
        tokens: tokens,
        comments: comments,
        anomalies: anomalies,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn words(scan: &Scan) -> Vec<String> {
        scan.get_tokens()
            .iter()
            .filter_map(|t| t.as_word().map(|w| w.to_string()))
            .collect()
    }

    #[test]
    fn strips_comments() {
        let scan = scan("entity foo is -- declares foo\nend;");
        assert_eq!(words(&scan), vec!["entity", "foo", "is", "end"]);
        assert_eq!(scan.get_comments(), &vec![(1, String::from(" declares foo"))]);
        assert_eq!(scan.get_anomalies().is_empty(), true);
    }

    #[test]
    fn elides_strings_and_chars() {
        let scan = scan("x <= \"entity fake is\" & 'u' & clk'event;");
        assert_eq!(words(&scan), vec!["x", "clk", "event"]);
    }

    #[test]
    fn doubled_quote_escape() {
        let scan = scan("msg := \"say \"\"entity\"\" now\"; done");
        assert_eq!(words(&scan), vec!["msg", "done"]);
    }

    #[test]
    fn unterminated_string_is_anomalous() {
        let scan = scan("a <= \"oops;\nb <= '1';");
        assert_eq!(scan.get_anomalies().len(), 1);
        assert_eq!(scan.get_anomalies()[0].0, 1);
    }

    #[test]
    fn numbers_do_not_leak_delimiters() {
        let scan = scan("wait for 12.5 ns; y <= 16#FF#; z <= 1e6;");
        let dots = scan
            .get_tokens()
            .iter()
            .filter(|t| t.is_delim('.'))
            .count();
        assert_eq!(dots, 0);
        assert_eq!(words(&scan), vec!["wait", "for", "ns", "y", "z"]);
    }

    #[test]
    fn tracks_lines() {
        let scan = scan("entity a is\nend;\narchitecture b of a is\nbegin\nend;");
        let arch = scan
            .get_tokens()
            .iter()
            .find(|t| t.check_keyword("architecture"))
            .unwrap();
        assert_eq!(arch.get_line(), 3);
    }

    #[test]
    fn extended_identifier_survives() {
        let scan = scan(r"entity \My Entity\ is");
        assert_eq!(words(&scan), vec!["entity", r"\My Entity\", "is"]);
    }

    #[test]
    fn selected_names_keep_dots() {
        let scan = scan("use work.util_pkg.all;");
        let expect: Vec<Token> = vec![
            Token::Word(String::from("use")),
            Token::Word(String::from("work")),
            Token::Delim('.'),
            Token::Word(String::from("util_pkg")),
            Token::Delim('.'),
            Token::Word(String::from("all")),
            Token::Delim(';'),
        ];
        let got: Vec<Token> = scan.get_tokens().iter().map(|l| l.token.clone()).collect();
        assert_eq!(got, expect);
    }
}
