//! Session language and the static key → text tables.
//!
//! A [`Locale`] is created once per session and handed to every function
//! that produces user-facing text. It only changes through
//! [`Locale::set_language`].

use std::fmt;
use std::str::FromStr;

use crate::model::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Ru,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Self::Ru),
            "en" => Ok(Self::En),
            other => Err(format!("unsupported language `{other}` (expected ru or en)")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Locale {
    language: Language,
}

impl Locale {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Look up a UI string. Unknown keys come back unchanged.
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        let table = match self.language {
            Language::Ru => RU,
            Language::En => EN,
        };
        table
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .unwrap_or(key)
    }

    /// Localized document type, falling back to the raw type string.
    pub fn doc_type_label(&self, document_type: &str) -> String {
        let key = format!("docType.{}", document_type.trim().to_ascii_lowercase());
        match self.t(&key) {
            found if found != key => found.to_string(),
            _ => document_type.to_string(),
        }
    }

    pub fn level_name(&self, level: RiskLevel) -> &'static str {
        match level {
            RiskLevel::Low => self.t("level.low"),
            RiskLevel::Medium => self.t("level.medium"),
            RiskLevel::High => self.t("level.high"),
            RiskLevel::Unknown => self.t("level.unknown"),
        }
    }
}

const RU: &[(&str, &str)] = &[
    ("selectFile", "Выберите файл для загрузки"),
    ("fileTooLarge", "Файл слишком большой"),
    ("analysisError", "Ошибка при анализе документа"),
    ("networkError", "Не удалось подключиться к серверу"),
    ("malformedResult", "Сервер вернул неполный результат"),
    ("exportError", "Не удалось сформировать отчёт"),
    ("analyzeButton", "Анализировать"),
    ("analyzing", "Анализирую..."),
    ("downloadPDF", "Скачать PDF отчёт"),
    ("exporting", "Формирую отчёт..."),
    ("resultsTitle", "Результаты анализа"),
    ("reportTitle", "Отчёт об анализе документа"),
    ("basicInfo", "Основная информация"),
    ("financialTerms", "Финансовые условия"),
    ("rentalTerms", "Условия аренды"),
    ("applicant", "Заявитель"),
    ("obligations", "Обязательства"),
    ("risks", "Риски"),
    ("noRisks", "Риски не обнаружены"),
    ("recommendations", "Рекомендации"),
    ("summary", "Резюме"),
    ("confidence", "Уверенность"),
    ("type", "Тип"),
    ("subtype", "Подтип"),
    ("parties", "Стороны"),
    ("amount", "Сумма"),
    ("notSpecified", "Не указана"),
    ("date.signature", "Дата подписания"),
    ("date.start", "Дата начала"),
    ("date.end", "Дата окончания"),
    ("date.paymentDue", "Срок оплаты"),
    ("interestRate", "Процентная ставка"),
    ("loanTerm", "Срок кредита"),
    ("monthlyPayment", "Ежемесячный платёж"),
    ("penalties", "Штрафы"),
    ("paymentSchedule", "График платежей"),
    ("monthlyRent", "Ежемесячная аренда"),
    ("deposit", "Залог"),
    ("utilities", "Коммунальные услуги"),
    ("leaseDuration", "Срок аренды"),
    ("fullName", "ФИО"),
    ("birthDate", "Дата рождения"),
    ("passport", "Паспорт"),
    ("taxId", "ИНН"),
    ("socialInsuranceId", "СНИЛС"),
    ("phone", "Телефон"),
    ("email", "Email"),
    ("monthlyIncome", "Ежемесячный доход"),
    ("employment", "Место работы"),
    ("maritalStatus", "Семейное положение"),
    ("childrenCount", "Количество детей"),
    ("suggestion", "Рекомендация"),
    ("generated", "Сформировано"),
    ("page", "Стр."),
    ("disclaimer", "Не является юридической консультацией"),
    ("history", "История анализов"),
    ("historyEmpty", "История пуста"),
    ("historyError", "Ошибка загрузки данных"),
    ("riskCount", "Рисков"),
    ("docType.contract", "Договор"),
    ("docType.invoice", "Счёт"),
    ("docType.act", "Акт"),
    ("docType.other", "Другое"),
    ("level.low", "НИЗКИЙ"),
    ("level.medium", "СРЕДНИЙ"),
    ("level.high", "ВЫСОКИЙ"),
    ("level.unknown", "НЕИЗВЕСТНО"),
    ("stats", "Статистика"),
    ("totalDocuments", "Всего документов"),
    ("avgConfidence", "Средняя уверенность"),
    ("totalRisks", "Всего рисков найдено"),
];

const EN: &[(&str, &str)] = &[
    ("selectFile", "Select a file to upload"),
    ("fileTooLarge", "The file is too large"),
    ("analysisError", "Error analyzing document"),
    ("networkError", "Could not connect to the server"),
    ("malformedResult", "The server returned an incomplete result"),
    ("exportError", "Could not generate the report"),
    ("analyzeButton", "Analyze"),
    ("analyzing", "Analyzing..."),
    ("downloadPDF", "Download PDF Report"),
    ("exporting", "Generating report..."),
    ("resultsTitle", "Analysis Results"),
    ("reportTitle", "Document Analysis Report"),
    ("basicInfo", "Basic Information"),
    ("financialTerms", "Financial Terms"),
    ("rentalTerms", "Rental Terms"),
    ("applicant", "Applicant"),
    ("obligations", "Obligations"),
    ("risks", "Risks"),
    ("noRisks", "No risks found"),
    ("recommendations", "Recommendations"),
    ("summary", "Summary"),
    ("confidence", "Confidence"),
    ("type", "Type"),
    ("subtype", "Subtype"),
    ("parties", "Parties"),
    ("amount", "Amount"),
    ("notSpecified", "Not specified"),
    ("date.signature", "Signature date"),
    ("date.start", "Start date"),
    ("date.end", "End date"),
    ("date.paymentDue", "Payment due"),
    ("interestRate", "Interest rate"),
    ("loanTerm", "Loan term"),
    ("monthlyPayment", "Monthly payment"),
    ("penalties", "Penalties"),
    ("paymentSchedule", "Payment schedule"),
    ("monthlyRent", "Monthly rent"),
    ("deposit", "Deposit"),
    ("utilities", "Utilities"),
    ("leaseDuration", "Lease duration"),
    ("fullName", "Full name"),
    ("birthDate", "Date of birth"),
    ("passport", "Passport"),
    ("taxId", "Tax ID"),
    ("socialInsuranceId", "Social insurance ID"),
    ("phone", "Phone"),
    ("email", "Email"),
    ("monthlyIncome", "Monthly income"),
    ("employment", "Employment"),
    ("maritalStatus", "Marital status"),
    ("childrenCount", "Children"),
    ("suggestion", "Suggestion"),
    ("generated", "Generated"),
    ("page", "Page"),
    ("disclaimer", "Not a legal consultation"),
    ("history", "Analysis History"),
    ("historyEmpty", "History is empty"),
    ("historyError", "Error loading data"),
    ("riskCount", "Risks"),
    ("docType.contract", "Contract"),
    ("docType.invoice", "Invoice"),
    ("docType.act", "Act"),
    ("docType.other", "Other"),
    ("level.low", "LOW"),
    ("level.medium", "MEDIUM"),
    ("level.high", "HIGH"),
    ("level.unknown", "UNKNOWN"),
    ("stats", "Statistics"),
    ("totalDocuments", "Total documents"),
    ("avgConfidence", "Average confidence"),
    ("totalRisks", "Total risks found"),
];
