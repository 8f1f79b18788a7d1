//! Token stream to document tree
//!
//! The parser never fails. Unknown or malformed constructs are recorded as
//! [`ParseWarning`]s and replaced by a best-effort node (or nothing).

use wtc_ast::{Document, Node, NodeKind, Options, SetupDirective};

use super::registry::{
    resolve_command, resolve_environment, Arg, CommandDef, CommandTarget, EnvironmentTarget,
    NodeTemplate,
};
use super::token::{detokenize, Token};
use super::{ParseOutput, ParseWarning};

/// Result of parsing one construct
enum Parsed {
    Node(Node),
    /// `\item`, only meaningful directly inside a list
    Item,
    Nothing,
}

/// Arguments read for a command, in declaration order
#[derive(Default)]
struct CommandArgs {
    optional: Option<Vec<Token>>,
    required: Vec<Vec<Token>>,
}

impl CommandArgs {
    fn optional_raw(&self) -> Option<String> {
        self.optional.as_deref().map(detokenize)
    }

    fn required_raw(&self, index: usize) -> String {
        self.required
            .get(index)
            .map(|tokens| detokenize(tokens))
            .unwrap_or_default()
    }
}

static EOF: Token = Token::Eof;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Metadata sink; discarded for argument sub-parses
    doc: Document,
    warnings: Vec<ParseWarning>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            tokens.push(Token::Eof);
        }
        Parser {
            tokens,
            pos: 0,
            doc: Document::new(),
            warnings: Vec::new(),
        }
    }

    /// Parse the whole stream into a document.
    pub fn parse(mut self) -> ParseOutput {
        while !self.at_eof() {
            if let Parsed::Node(node) = self.parse_token() {
                self.doc.children.push(node);
            }
        }
        ParseOutput {
            document: self.doc,
            warnings: self.warnings,
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn warn(&mut self, warning: ParseWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    // =========================================================================
    // Group reading
    // =========================================================================

    /// Read a balanced `open ... close` group, returning the inner tokens.
    ///
    /// `None` if the next token is not `open`. An unclosed group runs to
    /// end of input.
    fn read_group(&mut self, open: &Token, close: &Token) -> Option<Vec<Token>> {
        if self.peek() != open {
            return None;
        }
        self.pos += 1;

        let mut depth = 1usize;
        let mut inner = Vec::new();
        loop {
            let token = self.peek();
            if token.is_eof() {
                break;
            }
            if token == open {
                depth += 1;
            } else if token == close {
                depth -= 1;
                if depth == 0 {
                    self.pos += 1;
                    break;
                }
            }
            inner.push(self.bump());
        }
        Some(inner)
    }

    fn read_brace_tokens(&mut self) -> Option<Vec<Token>> {
        self.read_group(&Token::OpenBrace, &Token::CloseBrace)
    }

    fn read_bracket_tokens(&mut self) -> Option<Vec<Token>> {
        self.read_group(&Token::OpenBracket, &Token::CloseBracket)
    }

    /// Raw source text of a `{...}` group, empty if absent
    fn read_brace_raw(&mut self) -> String {
        self.read_brace_tokens()
            .map(|tokens| detokenize(&tokens))
            .unwrap_or_default()
    }

    fn read_args(&mut self, def: &CommandDef) -> CommandArgs {
        let mut args = CommandArgs::default();
        for arg in def.args {
            match arg {
                Arg::Optional => args.optional = self.read_bracket_tokens(),
                Arg::Required => {
                    let tokens = self.read_brace_tokens().unwrap_or_default();
                    args.required.push(tokens);
                }
            }
        }
        args
    }

    /// Parse an argument as an independent token stream.
    ///
    /// Metadata commands inside it are consumed and dropped; warnings are
    /// kept in order.
    fn sub_parse(&mut self, tokens: Vec<Token>) -> Vec<Node> {
        let output = Parser::new(tokens).parse();
        self.warnings.extend(output.warnings);
        output.document.children
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn parse_token(&mut self) -> Parsed {
        match self.peek() {
            Token::Text(_) | Token::Math(_) => match self.bump() {
                Token::Text(value) => Parsed::Node(Node::text(value)),
                Token::Math(value) => Parsed::Node(Node::new(NodeKind::Math { value })),
                _ => Parsed::Nothing,
            },
            Token::Newline => {
                self.bump();
                Parsed::Node(Node::new(NodeKind::Newline))
            }
            Token::ParagraphBreak => {
                self.bump();
                Parsed::Node(Node::new(NodeKind::ParagraphBreak))
            }
            Token::Command(_) => self.parse_command(),
            Token::Begin => self.parse_environment(),
            Token::End => {
                let at = self.pos;
                self.bump();
                let name = self.read_brace_raw();
                self.warn(
                    ParseWarning::mismatched_end(&name, None)
                        .with_location(format!("token {}", at)),
                );
                Parsed::Nothing
            }
            Token::OpenBrace => self.parse_bare_group(),
            Token::OpenBracket => {
                self.bump();
                Parsed::Node(Node::text("["))
            }
            Token::CloseBracket => {
                self.bump();
                Parsed::Node(Node::text("]"))
            }
            Token::CloseBrace => {
                self.bump();
                Parsed::Nothing
            }
            Token::Eof => Parsed::Nothing,
        }
    }

    fn parse_bare_group(&mut self) -> Parsed {
        self.bump();
        let mut children = Vec::new();
        loop {
            match self.peek() {
                Token::Eof => break,
                Token::CloseBrace => {
                    self.bump();
                    break;
                }
                _ => {
                    if let Parsed::Node(node) = self.parse_token() {
                        children.push(node);
                    }
                }
            }
        }

        match children.len() {
            0 => Parsed::Nothing,
            1 => children.pop().map_or(Parsed::Nothing, Parsed::Node),
            _ => Parsed::Node(Node::new(NodeKind::Group).with_children(children)),
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    fn parse_command(&mut self) -> Parsed {
        let at = self.pos;
        let Token::Command(name) = self.bump() else {
            return Parsed::Nothing;
        };

        let Some(def) = resolve_command(&name) else {
            self.warn(ParseWarning::unknown_command(&name).with_location(format!("token {}", at)));
            let content = self.read_brace_raw();
            return Parsed::Node(Node::text(content));
        };

        let args = self.read_args(def);
        match def.target {
            CommandTarget::DocumentClass => {
                self.doc.document_class = args.required_raw(0);
                self.doc.template = args.optional_raw().unwrap_or_default();
                Parsed::Nothing
            }
            CommandTarget::Title => {
                self.doc.title = args.required_raw(0);
                Parsed::Nothing
            }
            CommandTarget::Chapter => {
                self.doc.chapter = args.required_raw(0);
                Parsed::Nothing
            }
            CommandTarget::ItemSeparator => Parsed::Item,
            CommandTarget::Ignore => Parsed::Nothing,
            CommandTarget::Setup(kind) => {
                let required = args.required_raw(0);
                let source = if required.is_empty() {
                    args.optional_raw().unwrap_or_default()
                } else {
                    required
                };
                self.doc
                    .setup
                    .push(SetupDirective::new(kind, Options::parse(&source)));
                Parsed::Nothing
            }
            CommandTarget::Node(template) => Parsed::Node(self.build_node(template, def, args)),
        }
    }

    fn build_node(&mut self, template: NodeTemplate, def: &CommandDef, args: CommandArgs) -> Node {
        let optional = args.optional_raw();
        let options = match (&optional, def.default) {
            (None, Some(default)) => Options::value(default),
            _ => Options::parse(optional.as_deref().unwrap_or_default()),
        };
        // value of count/level commands: the optional argument if present at all
        let value = optional
            .clone()
            .unwrap_or_else(|| def.default.unwrap_or("1").to_string());

        let kind = match template {
            NodeTemplate::Jiazhu { single } => NodeKind::Jiazhu { single },
            NodeTemplate::SideNote => NodeKind::SideNote,
            NodeTemplate::MeiPi => NodeKind::MeiPi,
            NodeTemplate::PiZhu => NodeKind::PiZhu,
            NodeTemplate::TextBox => NodeKind::TextBox,
            NodeTemplate::FillTextBox => NodeKind::FillTextBox,
            NodeTemplate::Decoration(style) => NodeKind::Decoration { style },
            NodeTemplate::Space => NodeKind::Space {
                count: parse_count(&value),
            },
            NodeTemplate::NuoTai => NodeKind::NuoTai {
                count: parse_count(&value),
            },
            NodeTemplate::Taitou => NodeKind::Taitou {
                level: parse_level(&value),
            },
            NodeTemplate::RelativeTaitou => NodeKind::RelativeTaitou {
                offset: parse_level(&value),
            },
            NodeTemplate::SetIndent => NodeKind::SetIndent {
                indent: parse_level(&args.required_raw(0)),
            },
            NodeTemplate::ColumnBreak => NodeKind::ColumnBreak,
            NodeTemplate::Stamp => NodeKind::Stamp {
                src: args.required_raw(0),
            },
            NodeTemplate::CatalogEntry => NodeKind::CatalogEntry,
        };

        let children = match (&kind, args.required.into_iter().next()) {
            (NodeKind::Stamp { .. } | NodeKind::SetIndent { .. }, _) | (_, None) => Vec::new(),
            (_, Some(tokens)) => self.sub_parse(tokens),
        };

        Node::new(kind).with_options(options).with_children(children)
    }

    // =========================================================================
    // Environments
    // =========================================================================

    fn parse_environment(&mut self) -> Parsed {
        self.bump();
        let name = self.read_brace_raw().trim().to_string();

        let Some(def) = resolve_environment(&name) else {
            self.warn(ParseWarning::unknown_environment(&name));
            let children = nodes_only(self.parse_until_end(&name));
            return Parsed::Node(Node::new(NodeKind::Unknown { name }).with_children(children));
        };

        let options = if def.has_options {
            self.read_bracket_tokens()
                .map(|tokens| Options::parse(&detokenize(&tokens)))
                .unwrap_or_default()
        } else {
            Options::new()
        };

        let body = self.parse_until_end(&name);
        let (kind, children) = match def.target {
            EnvironmentTarget::Body => (NodeKind::Body, nodes_only(body)),
            EnvironmentTarget::ContentBlock => (NodeKind::ContentBlock, nodes_only(body)),
            EnvironmentTarget::Paragraph => (NodeKind::Paragraph, nodes_only(body)),
            EnvironmentTarget::Jiazhu => (NodeKind::Jiazhu { single: false }, nodes_only(body)),
            EnvironmentTarget::List => (NodeKind::List, group_list_items(body)),
        };
        Parsed::Node(Node::new(kind).with_options(options).with_children(children))
    }

    /// Parse until `\end{name}`; a different end name is reported and skipped.
    fn parse_until_end(&mut self, name: &str) -> Vec<Parsed> {
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                Token::Eof => {
                    self.warn(ParseWarning::unclosed_environment(name));
                    break;
                }
                Token::End => {
                    self.bump();
                    let end_name = self.read_brace_raw();
                    if end_name.trim() == name {
                        break;
                    }
                    self.warn(ParseWarning::mismatched_end(&end_name, Some(name)));
                }
                _ => match self.parse_token() {
                    Parsed::Nothing => {}
                    part => parts.push(part),
                },
            }
        }
        parts
    }
}

fn nodes_only(parts: Vec<Parsed>) -> Vec<Node> {
    parts
        .into_iter()
        .filter_map(|part| match part {
            Parsed::Node(node) => Some(node),
            _ => None,
        })
        .collect()
}

/// Group list content into item containers.
///
/// Content before the first `\item` goes into an implicit leading item.
fn group_list_items(parts: Vec<Parsed>) -> Vec<Node> {
    let mut items: Vec<Node> = Vec::new();
    for part in parts {
        match part {
            Parsed::Item => items.push(Node::new(NodeKind::ListItem)),
            Parsed::Node(node) => match items.last_mut() {
                Some(item) => item.children.push(node),
                None => items.push(Node::new(NodeKind::ListItem).with_children(vec![node])),
            },
            Parsed::Nothing => {}
        }
    }
    items
}

/// Cell count argument; unparsable or zero means 1
fn parse_count(value: &str) -> usize {
    value.trim().parse().ok().filter(|n| *n > 0).unwrap_or(1)
}

/// Level or indent argument; unparsable means 0
fn parse_level(value: &str) -> usize {
    value.trim().parse().unwrap_or(0)
}
