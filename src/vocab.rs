//! Controlled vocabularies for fields the sources emit as free text
//!
//! Records keep the raw strings; these enums are an optional typed view.
//! Parsing is case-insensitive and tolerant of the spacing/punctuation
//! variants the APIs use ("Over-the-counter", "OVER THE COUNTER", ...).

use std::str::FromStr;

/// Lower-case and fold separators so that `"Manuf (CMC)"` becomes `"manuf_cmc"`
pub(crate) fn vocab_key(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace(", ", "_")
        .replace([' ', '-', '/'], "_")
        .replace(['(', ')'], "")
}

/// How a drug product is sold in the United States
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketingStatus {
    Prescription,
    OverTheCounter,
    Discontinued,
    /// Tentatively approved, not marketed
    NoneTentativeApproval,
    None,
}

impl FromStr for MarketingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "prescription" => Ok(Self::Prescription),
            "over_the_counter" | "otc" => Ok(Self::OverTheCounter),
            "discontinued" => Ok(Self::Discontinued),
            "none_tentative_approval" => Ok(Self::NoneTentativeApproval),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// Original application or supplement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionType {
    Original,
    Supplement,
}

impl FromStr for SubmissionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "orig" => Ok(Self::Original),
            "suppl" => Ok(Self::Supplement),
            _ => Err(()),
        }
    }
}

/// FDA review priority rating of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewPriority {
    Standard,
    Priority,
    Unknown,
    NotApplicable,
    Require901,
    Order901,
}

impl FromStr for ReviewPriority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "standard" => Ok(Self::Standard),
            "priority" => Ok(Self::Priority),
            "unknown" => Ok(Self::Unknown),
            "n_a" => Ok(Self::NotApplicable),
            "901_required" | "require_901" => Ok(Self::Require901),
            "901_order" | "order_901" => Ok(Self::Order901),
            _ => Err(()),
        }
    }
}

/// Outcome of a submission: approved or tentatively approved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionStatus {
    /// `AP`
    Approved,
    /// `TA`
    TentativeApproval,
}

impl FromStr for SubmissionStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "ap" | "approved" => Ok(Self::Approved),
            "ta" | "tentative_approval" => Ok(Self::TentativeApproval),
            _ => Err(()),
        }
    }
}

/// Review classification of a submission
///
/// Original applications carry a chemical type (`TYPE 1` through `TYPE 10`,
/// sometimes combined as `TYPE 1/4`); supplements carry a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionClassCode {
    Bioequivalence,
    Efficacy,
    Labeling,
    /// Manufacturing (CMC)
    ManufacturingCmc,
    MedicalGas,
    NotApplicable,
    Rems,
    S,
    Unknown,
    Type(u8),
    TypeCombination(u8, u8),
}

impl FromStr for SubmissionClassCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = vocab_key(s);
        match key.as_str() {
            "bioequiv" => return Ok(Self::Bioequivalence),
            "efficacy" => return Ok(Self::Efficacy),
            "labeling" => return Ok(Self::Labeling),
            "manuf_cmc" => return Ok(Self::ManufacturingCmc),
            "medgas" => return Ok(Self::MedicalGas),
            "n_a" => return Ok(Self::NotApplicable),
            "rems" => return Ok(Self::Rems),
            "s" => return Ok(Self::S),
            "unknown" => return Ok(Self::Unknown),
            _ => {}
        }

        let chemical_type = |n: &str| n.parse::<u8>().ok().filter(|n| (1..=10).contains(n));
        let numbers: Vec<&str> = key.strip_prefix("type_").ok_or(())?.split('_').collect();
        match numbers.as_slice() {
            [single] => chemical_type(*single).map(Self::Type).ok_or(()),
            [first, second] => match (chemical_type(*first), chemical_type(*second)) {
                (Some(a), Some(b)) => Ok(Self::TypeCombination(a, b)),
                _ => Err(()),
            },
            _ => Err(()),
        }
    }
}

/// Kind of document attached to a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationDocType {
    At,
    ExclusivityLetter,
    FdaPressRelease,
    FederalRegisterNotice,
    HealthcareProfessionalSheet,
    Label,
    Letter,
    MedicationGuide,
    Other,
    OtherImportantInformationFromFda,
    PatientInformationSheet,
    PatientPackageInsert,
    PediatricAddendum,
    /// `Pediatric Amendment 1` through `7`
    PediatricAmendment(u8),
    PediatricCdtlReview,
    PediatricClinicalPharmacologyAddendum,
    PediatricClinicalPharmacologyReview,
    PediatricDdSummaryReview,
    PediatricMedicalReview,
    PediatricMemo,
    PediatricOther,
    PediatricReissue,
    /// `Pediatric Reissue Amendment 1` through `6`
    PediatricReissueAmendment(u8),
    PediatricStatisticalReview,
    PediatricWrittenRequest,
    Rems,
    Review,
    SummaryReview,
    WithdrawalNotice,
}

impl FromStr for ApplicationDocType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = vocab_key(s);
        let numbered = |prefix: &str| -> Option<u8> { key.strip_prefix(prefix)?.parse().ok().filter(|n| *n >= 1) };
        if let Some(n) = numbered("pediatric_reissue_amendment_") {
            return Ok(Self::PediatricReissueAmendment(n));
        }
        if let Some(n) = numbered("pediatric_amendment_") {
            return Ok(Self::PediatricAmendment(n));
        }

        match key.as_str() {
            "at" => Ok(Self::At),
            "exclusivity_letter" => Ok(Self::ExclusivityLetter),
            "fda_press_release" => Ok(Self::FdaPressRelease),
            "federal_register_notice" => Ok(Self::FederalRegisterNotice),
            "healthcare_professional_sheet" => Ok(Self::HealthcareProfessionalSheet),
            "label" => Ok(Self::Label),
            "letter" => Ok(Self::Letter),
            "medication_guide" => Ok(Self::MedicationGuide),
            "other" => Ok(Self::Other),
            "other_important_information_from_fda" => Ok(Self::OtherImportantInformationFromFda),
            "patient_information_sheet" => Ok(Self::PatientInformationSheet),
            "patient_package_insert" => Ok(Self::PatientPackageInsert),
            "pediatric_addendum" => Ok(Self::PediatricAddendum),
            "pediatric_cdtl_review" => Ok(Self::PediatricCdtlReview),
            "pediatric_clinical_pharmacology_addendum" => Ok(Self::PediatricClinicalPharmacologyAddendum),
            "pediatric_clinical_pharmacology_review" => Ok(Self::PediatricClinicalPharmacologyReview),
            "pediatric_dd_summary_review" => Ok(Self::PediatricDdSummaryReview),
            "pediatric_medical_review" => Ok(Self::PediatricMedicalReview),
            "pediatric_memo" => Ok(Self::PediatricMemo),
            "pediatric_other" => Ok(Self::PediatricOther),
            "pediatric_reissue" => Ok(Self::PediatricReissue),
            "pediatric_statistical_review" => Ok(Self::PediatricStatisticalReview),
            "pediatric_written_request" => Ok(Self::PediatricWrittenRequest),
            "rems" => Ok(Self::Rems),
            "review" => Ok(Self::Review),
            "summary_review" => Ok(Self::SummaryReview),
            "withdrawal_notice" => Ok(Self::WithdrawalNotice),
            _ => Err(()),
        }
    }
}

/// Orange Book therapeutic equivalence evaluation code
///
/// `A` codes are therapeutically equivalent to the reference product, `B`
/// codes are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TherapeuticEquivalenceCode {
    Aa,
    Ab,
    Ab1,
    Ab2,
    Ab3,
    Ab4,
    An,
    Ao,
    Ap,
    Ap1,
    Ap2,
    At,
    At1,
    Bc,
    Bs,
    Bt,
    Bx,
    /// Not yet evaluated
    Tbd,
}

impl TherapeuticEquivalenceCode {
    /// `None` while the code is still `TBD`
    pub fn is_equivalent(&self) -> Option<bool> {
        match self {
            Self::Tbd => None,
            Self::Bc | Self::Bs | Self::Bt | Self::Bx => Some(false),
            _ => Some(true),
        }
    }
}

impl FromStr for TherapeuticEquivalenceCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "aa" => Ok(Self::Aa),
            "ab" => Ok(Self::Ab),
            "ab1" => Ok(Self::Ab1),
            "ab2" => Ok(Self::Ab2),
            "ab3" => Ok(Self::Ab3),
            "ab4" => Ok(Self::Ab4),
            "an" => Ok(Self::An),
            "ao" => Ok(Self::Ao),
            "ap" => Ok(Self::Ap),
            "ap1" => Ok(Self::Ap1),
            "ap2" => Ok(Self::Ap2),
            "at" => Ok(Self::At),
            "at1" => Ok(Self::At1),
            "bc" => Ok(Self::Bc),
            "bs" => Ok(Self::Bs),
            "bt" => Ok(Self::Bt),
            "bx" => Ok(Self::Bx),
            "tbd" => Ok(Self::Tbd),
            _ => Err(()),
        }
    }
}

/// openFDA product type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenFdaProductType {
    HumanPrescriptionDrug,
    HumanOtcDrug,
}

impl FromStr for OpenFdaProductType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "human_prescription_drug" => Ok(Self::HumanPrescriptionDrug),
            "human_otc_drug" => Ok(Self::HumanOtcDrug),
            _ => Err(()),
        }
    }
}

/// Kind of FDA application, from the application number prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationKind {
    /// New Drug Application
    Nda,
    /// Abbreviated New Drug Application (generics)
    Anda,
    /// Biologics License Application
    Bla,
}

impl ApplicationKind {
    /// Kind for an application number such as `NDA207145`
    pub fn from_application_number(number: &str) -> Option<Self> {
        let upper = number.trim().to_ascii_uppercase();
        if upper.starts_with("ANDA") {
            Some(Self::Anda)
        } else if upper.starts_with("NDA") {
            Some(Self::Nda)
        } else if upper.starts_with("BLA") {
            Some(Self::Bla)
        } else {
            None
        }
    }
}

/// Recruitment status of a study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverallStatus {
    ActiveNotRecruiting,
    Completed,
    EnrollingByInvitation,
    NotYetRecruiting,
    Recruiting,
    Suspended,
    Terminated,
    Withdrawn,
    Available,
    NoLongerAvailable,
    TemporarilyNotAvailable,
    ApprovedForMarketing,
    Withheld,
    Unknown,
}

impl FromStr for OverallStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "active_not_recruiting" => Ok(Self::ActiveNotRecruiting),
            "completed" => Ok(Self::Completed),
            "enrolling_by_invitation" => Ok(Self::EnrollingByInvitation),
            "not_yet_recruiting" => Ok(Self::NotYetRecruiting),
            "recruiting" => Ok(Self::Recruiting),
            "suspended" => Ok(Self::Suspended),
            "terminated" => Ok(Self::Terminated),
            "withdrawn" => Ok(Self::Withdrawn),
            "available" => Ok(Self::Available),
            "no_longer_available" => Ok(Self::NoLongerAvailable),
            "temporarily_not_available" => Ok(Self::TemporarilyNotAvailable),
            "approved_for_marketing" => Ok(Self::ApprovedForMarketing),
            "withheld" => Ok(Self::Withheld),
            "unknown" => Ok(Self::Unknown),
            _ => Err(()),
        }
    }
}

/// Clinical study phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StudyPhase {
    NotApplicable,
    EarlyPhase1,
    Phase1,
    Phase2,
    Phase3,
    Phase4,
}

impl FromStr for StudyPhase {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "na" | "n_a" => Ok(Self::NotApplicable),
            "early_phase1" | "early_phase_1" => Ok(Self::EarlyPhase1),
            "phase1" | "phase_1" => Ok(Self::Phase1),
            "phase2" | "phase_2" => Ok(Self::Phase2),
            "phase3" | "phase_3" => Ok(Self::Phase3),
            "phase4" | "phase_4" => Ok(Self::Phase4),
            _ => Err(()),
        }
    }
}

/// Authority asserting an RxClass relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationSource {
    Atc,
    AtcProd,
    DailyMed,
    FdaSpl,
    Fmtsme,
    MedRt,
    RxNorm,
    SnomedCt,
    Va,
}

impl RelationSource {
    /// Value the RxClass API expects in `relaSource`
    pub fn as_api_str(&self) -> &'static str {
        match self {
            RelationSource::Atc => "ATC",
            RelationSource::AtcProd => "ATCPROD",
            RelationSource::DailyMed => "DAILYMED",
            RelationSource::FdaSpl => "FDASPL",
            RelationSource::Fmtsme => "FMTSME",
            RelationSource::MedRt => "MEDRT",
            RelationSource::RxNorm => "RXNORM",
            RelationSource::SnomedCt => "SNOMEDCT",
            RelationSource::Va => "VA",
        }
    }
}

impl FromStr for RelationSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "atc" => Ok(Self::Atc),
            "atcprod" | "atc_prod" => Ok(Self::AtcProd),
            "dailymed" => Ok(Self::DailyMed),
            "fdaspl" | "fda_spl" => Ok(Self::FdaSpl),
            "fmtsme" => Ok(Self::Fmtsme),
            "medrt" | "med_rt" => Ok(Self::MedRt),
            "rxnorm" => Ok(Self::RxNorm),
            "snomedct" => Ok(Self::SnomedCt),
            "va" => Ok(Self::Va),
            _ => Err(()),
        }
    }
}

/// RxNorm term type (`tty`) of a concept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermType {
    /// `IN`
    Ingredient,
    /// `PIN`
    PreciseIngredient,
    /// `MIN`
    MultipleIngredients,
    /// `SCDC`
    SemanticClinicalDrugComponent,
    /// `SCDF`
    SemanticClinicalDrugForm,
    /// `SCDFP`
    SemanticClinicalDrugFormPrecise,
    /// `SCDG`
    SemanticClinicalDrugGroup,
    /// `SCDGP`
    SemanticClinicalDrugFormGroupPrecise,
    /// `SCD`
    SemanticClinicalDrug,
    /// `GPCK`
    GenericPack,
    /// `BN`
    BrandName,
    /// `SBDC`
    SemanticBrandedDrugComponent,
    /// `SBDF`
    SemanticBrandedDrugForm,
    /// `SBDFP`
    SemanticBrandedDrugFormPrecise,
    /// `SBDG`
    SemanticBrandedDrugGroup,
    /// `SBD`
    SemanticBrandedDrug,
    /// `BPCK`
    BrandNamePack,
    /// `DF`
    DoseForm,
    /// `DFG`
    DoseFormGroup,
}

impl FromStr for TermType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "in" | "ingredient" => Ok(Self::Ingredient),
            "pin" | "precise_ingredient" => Ok(Self::PreciseIngredient),
            "min" | "multiple_ingredients" => Ok(Self::MultipleIngredients),
            "scdc" => Ok(Self::SemanticClinicalDrugComponent),
            "scdf" => Ok(Self::SemanticClinicalDrugForm),
            "scdfp" => Ok(Self::SemanticClinicalDrugFormPrecise),
            "scdg" => Ok(Self::SemanticClinicalDrugGroup),
            "scdgp" => Ok(Self::SemanticClinicalDrugFormGroupPrecise),
            "scd" => Ok(Self::SemanticClinicalDrug),
            "gpck" | "generic_pack" => Ok(Self::GenericPack),
            "bn" | "brand_name" => Ok(Self::BrandName),
            "sbdc" => Ok(Self::SemanticBrandedDrugComponent),
            "sbdf" => Ok(Self::SemanticBrandedDrugForm),
            "sbdfp" => Ok(Self::SemanticBrandedDrugFormPrecise),
            "sbdg" => Ok(Self::SemanticBrandedDrugGroup),
            "sbd" => Ok(Self::SemanticBrandedDrug),
            "bpck" | "brand_name_pack" => Ok(Self::BrandNamePack),
            "df" | "dose_form" => Ok(Self::DoseForm),
            "dfg" | "dose_form_group" => Ok(Self::DoseFormGroup),
            _ => Err(()),
        }
    }
}

/// Kind of RxClass drug class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassType {
    /// ATC levels 1 through 4 (`ATC1-4`)
    Atc1To4,
    Chemical,
    Disease,
    Disposition,
    /// Established pharmacologic class
    Epc,
    /// Mechanism of action
    Moa,
    /// Physiologic effect
    Pe,
    /// Pharmacokinetics
    Pk,
    Schedule,
    Structure,
    TherapeuticCategory,
    Therapeutic,
    Va,
}

impl FromStr for ClassType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "atc1_4" => Ok(Self::Atc1To4),
            "chem" => Ok(Self::Chemical),
            "disease" => Ok(Self::Disease),
            "dispos" => Ok(Self::Disposition),
            "epc" => Ok(Self::Epc),
            "moa" => Ok(Self::Moa),
            "pe" => Ok(Self::Pe),
            "pk" => Ok(Self::Pk),
            "schedule" => Ok(Self::Schedule),
            "struct" => Ok(Self::Structure),
            "tc" => Ok(Self::TherapeuticCategory),
            "therap" => Ok(Self::Therapeutic),
            "va" => Ok(Self::Va),
            _ => Err(()),
        }
    }
}

/// Relation between a drug and an RxClass class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    IsaDisposition,
    IsaTherapeutic,
    IsaStructure,
    HasIngredient,
    MayTreat,
    HasEpc,
    HasPe,
    HasMoa,
    CiWith,
    HasVaClass,
    HasVaClassExtended,
}

impl FromStr for Relation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab_key(s).as_str() {
            "isa_disposition" => Ok(Self::IsaDisposition),
            "isa_therapeutic" => Ok(Self::IsaTherapeutic),
            "isa_structure" => Ok(Self::IsaStructure),
            "has_ingredient" => Ok(Self::HasIngredient),
            "may_treat" => Ok(Self::MayTreat),
            "has_epc" => Ok(Self::HasEpc),
            "has_pe" => Ok(Self::HasPe),
            "has_moa" => Ok(Self::HasMoa),
            "ci_with" => Ok(Self::CiWith),
            "has_va_class" | "has_vaclass" => Ok(Self::HasVaClass),
            "has_va_class_extended" | "has_vaclass_extended" => Ok(Self::HasVaClassExtended),
            _ => Err(()),
        }
    }
}
