use std::fmt::{self, Display, Formatter};

/// The assembler directives (pseudo-operations).  Several keywords
/// are accepted for some of them; see [`Directive::KEYWORDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Directive {
    Org,
    Equ,
    Obj,
    /// Little-endian words (`DA`, `DW`).
    Da,
    /// Big-endian words.
    Ddb,
    /// Bytes (`DB`, `DFB`).
    Db,
    Asc,
    Dci,
    Str,
    Inv,
    Fls,
    Rev,
    Hex,
    Ds,
    Dsect,
    Dend,
    Msb,
    Rel,
    Extrn,
    Entry,
    Do,
    Else,
    Fin,
    IfNe,
    IfEq,
    IfGt,
    IfGe,
    IfLt,
    IfLe,
    Lst,
    LstDo,
    Page,
    Skp,
    Rep,
    Chr,
    Sbtl,
    Include,
    Macro,
    EndMacro,
    Fail,
    Chn,
    Maclib,
    Pause,
    Sav,
    Use,
    Dsk,
    IbufSiz,
    SbufSiz,
    Sw16,
    Set,
    X6502,
    Date,
    Time,
    IdNum,
    Pmc,
    Chk,
    Usr,
}

impl Directive {
    /// Every keyword the assembler recognises as a directive.
    pub(crate) const KEYWORDS: &'static [(&'static str, Directive)] = &[
        ("ORG", Directive::Org),
        ("EQU", Directive::Equ),
        ("OBJ", Directive::Obj),
        ("DA", Directive::Da),
        ("DW", Directive::Da),
        ("DDB", Directive::Ddb),
        ("DB", Directive::Db),
        ("DFB", Directive::Db),
        ("ASC", Directive::Asc),
        ("DCI", Directive::Dci),
        ("STR", Directive::Str),
        ("INV", Directive::Inv),
        ("FLS", Directive::Fls),
        ("REV", Directive::Rev),
        ("HEX", Directive::Hex),
        ("DS", Directive::Ds),
        ("DSECT", Directive::Dsect),
        ("DEND", Directive::Dend),
        ("MSB", Directive::Msb),
        ("REL", Directive::Rel),
        ("EXTRN", Directive::Extrn),
        ("EXT", Directive::Extrn),
        ("EXTN", Directive::Extrn),
        ("ENTRY", Directive::Entry),
        ("ENT", Directive::Entry),
        ("DO", Directive::Do),
        ("IF", Directive::Do),
        ("ELSE", Directive::Else),
        ("FIN", Directive::Fin),
        ("IFNE", Directive::IfNe),
        ("IFEQ", Directive::IfEq),
        ("IFGT", Directive::IfGt),
        ("IFGE", Directive::IfGe),
        ("IFLT", Directive::IfLt),
        ("IFLE", Directive::IfLe),
        ("LST", Directive::Lst),
        ("LIST", Directive::Lst),
        ("LSTDO", Directive::LstDo),
        ("PAGE", Directive::Page),
        ("PAG", Directive::Page),
        ("SKP", Directive::Skp),
        ("REP", Directive::Rep),
        ("CHR", Directive::Chr),
        ("SBTL", Directive::Sbtl),
        ("TTL", Directive::Sbtl),
        ("INCLUDE", Directive::Include),
        ("PUT", Directive::Include),
        ("MACRO", Directive::Macro),
        ("MAC", Directive::Macro),
        ("ENDM", Directive::EndMacro),
        ("EOM", Directive::EndMacro),
        ("FAIL", Directive::Fail),
        ("CHN", Directive::Chn),
        ("MACLIB", Directive::Maclib),
        ("PAUSE", Directive::Pause),
        ("SAV", Directive::Sav),
        ("USE", Directive::Use),
        ("DSK", Directive::Dsk),
        ("IBUFSIZ", Directive::IbufSiz),
        ("SBUFSIZ", Directive::SbufSiz),
        ("SW16", Directive::Sw16),
        ("SET", Directive::Set),
        ("X6502", Directive::X6502),
        ("DATE", Directive::Date),
        ("TIME", Directive::Time),
        ("IDNUM", Directive::IdNum),
        ("PMC", Directive::Pmc),
        (">>>", Directive::Pmc),
        ("CHK", Directive::Chk),
        ("USR", Directive::Usr),
    ];

    /// Look up a directive keyword, ignoring case.
    pub(crate) fn from_keyword(word: &str) -> Option<Directive> {
        Directive::KEYWORDS
            .iter()
            .find(|(keyword, _)| keyword.eq_ignore_ascii_case(word))
            .map(|(_, directive)| *directive)
    }

    /// The primary keyword for this directive.
    pub(crate) fn keyword(self) -> &'static str {
        Directive::KEYWORDS
            .iter()
            .find(|(_, directive)| *directive == self)
            .map_or("?", |(keyword, _)| keyword)
    }

    /// Directives which open a conditional-assembly block.
    pub(crate) fn is_conditional_opener(self) -> bool {
        matches!(
            self,
            Directive::Do
                | Directive::IfNe
                | Directive::IfEq
                | Directive::IfGt
                | Directive::IfGe
                | Directive::IfLt
                | Directive::IfLe
        )
    }

    /// Directives which are evaluated even inside a disabled
    /// conditional block, to keep the nesting balanced.
    pub(crate) fn is_conditional(self) -> bool {
        self.is_conditional_opener() || matches!(self, Directive::Else | Directive::Fin)
    }

    /// Directives which only shape the listing.
    pub(crate) fn is_listing_control(self) -> bool {
        matches!(
            self,
            Directive::Lst
                | Directive::LstDo
                | Directive::Page
                | Directive::Skp
                | Directive::Rep
                | Directive::Chr
                | Directive::Sbtl
        )
    }

    /// Directives we accept for compatibility but which have no
    /// effect on the output.
    pub(crate) fn is_inert(self) -> bool {
        matches!(
            self,
            Directive::Obj
                | Directive::Chn
                | Directive::Maclib
                | Directive::Pause
                | Directive::Sav
                | Directive::Use
                | Directive::Dsk
                | Directive::IbufSiz
                | Directive::SbufSiz
                | Directive::Sw16
                | Directive::Set
                | Directive::X6502
                | Directive::Date
                | Directive::Time
                | Directive::IdNum
                | Directive::Pmc
                | Directive::Chk
                | Directive::Usr
                | Directive::Macro
                | Directive::EndMacro
        )
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
